//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for login and credential
//! validation, parse request data, and interact with the `auth::service`
//! for core business logic.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::config::Config;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<LoginResponse>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.login(payload).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(
            response,
            "Login successful",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle password-only credential validation request
#[axum::debug_handler]
pub async fn validate_credentials(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<bool>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.validate_credentials(payload).await {
        Ok(is_valid) => Ok(ResponseJson(ApiResponse::success(
            is_valid,
            "Credentials validated",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Liveness probe for the auth API
#[axum::debug_handler]
pub async fn status() -> ResponseJson<ApiResponse<String>> {
    ResponseJson(ApiResponse::success(
        "Login API service is running".to_string(),
        "Request successful",
    ))
}
