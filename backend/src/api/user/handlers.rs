//! Handler functions for user registration and profile management endpoints.
//!
//! These functions process requests for user data, interact with the
//! service layer, and shape user-specific responses. Password hashes never
//! appear in any payload returned from here.

use crate::api::common::{ApiResponse, PaginationFilter, PaginationMeta, service_error_to_http};
use crate::database::models::{
    CreateNewUser, UpdatePassword, UpdateStatus, UpdateUser, UserResponse, UserStatistics,
    UserStatus,
};
use crate::services::user_service::UserService;
use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::Json as ResponseJson,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::str::FromStr;

/// Query parameters for the user list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Optional lifecycle status filter (e.g. `ACTIVE`)
    pub status: Option<String>,
}

/// Query parameters for existence checks.
#[derive(Debug, Deserialize)]
pub struct CheckUsernameQuery {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckEmailQuery {
    pub email: String,
}

/// Existence check result.
#[derive(Debug, serde::Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

/// Handle user registration
#[axum::debug_handler]
pub async fn create_user(
    Extension(pool): Extension<SqlitePool>,
    Json(payload): Json<CreateNewUser>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<UserResponse>>), (StatusCode, String)> {
    let service = UserService::new(&pool);

    match service.create_user(payload).await {
        Ok(user) => Ok((
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(
                UserResponse::from(user),
                "User created successfully",
            )),
        )),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Retrieves a user by its ID.
#[axum::debug_handler]
pub async fn get_user_by_id(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<UserResponse>>, (StatusCode, String)> {
    let service = UserService::new(&pool);

    match service.get_user_required(&id).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            UserResponse::from(user),
            "User retrieved successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Retrieves a user by username.
#[axum::debug_handler]
pub async fn get_user_by_username(
    Extension(pool): Extension<SqlitePool>,
    Path(username): Path<String>,
) -> Result<ResponseJson<ApiResponse<UserResponse>>, (StatusCode, String)> {
    let service = UserService::new(&pool);

    match service.get_user_by_username_required(&username).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            UserResponse::from(user),
            "User retrieved successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Paginated user listing with an optional status filter.
#[axum::debug_handler]
pub async fn list_users(
    Extension(pool): Extension<SqlitePool>,
    Query(query): Query<ListUsersQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<UserResponse>>>, (StatusCode, String)> {
    let status = match query.status.as_deref() {
        Some(raw) => match UserStatus::from_str(raw) {
            Ok(status) => Some(status),
            Err(_) => {
                let error_response = ApiResponse::<()>::error("Invalid user status", "VAL_001");
                return Err((
                    StatusCode::BAD_REQUEST,
                    serde_json::to_string(&error_response).unwrap(),
                ));
            }
        },
        None => None,
    };

    let pagination = PaginationFilter {
        page: query.page,
        per_page: query.per_page,
    };

    let service = UserService::new(&pool);

    match service.list_users(&pagination, status).await {
        Ok((users, total)) => {
            let meta = PaginationMeta::from_filter(&pagination, total);
            let items = users.into_iter().map(UserResponse::from).collect();
            Ok(ResponseJson(ApiResponse::paginated(
                items,
                meta,
                "Users retrieved successfully",
            )))
        }
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Updates mutable profile fields.
#[axum::debug_handler]
pub async fn update_user(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> Result<ResponseJson<ApiResponse<UserResponse>>, (StatusCode, String)> {
    let service = UserService::new(&pool);

    match service.update_user(&id, payload).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            UserResponse::from(user),
            "User updated successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Changes a user's password after verifying the old one.
#[axum::debug_handler]
pub async fn update_password(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePassword>,
) -> Result<ResponseJson<ApiResponse<()>>, (StatusCode, String)> {
    let service = UserService::new(&pool);

    match service.update_password(&id, payload).await {
        Ok(true) => Ok(ResponseJson(ApiResponse::success(
            (),
            "Password updated successfully",
        ))),
        Ok(false) => {
            let error_response =
                ApiResponse::<()>::error("Old password verification failed", "AUTH_002");
            Err((
                StatusCode::BAD_REQUEST,
                serde_json::to_string(&error_response).unwrap(),
            ))
        }
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Transitions a user to a new lifecycle status.
#[axum::debug_handler]
pub async fn update_status(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatus>,
) -> Result<ResponseJson<ApiResponse<UserResponse>>, (StatusCode, String)> {
    let service = UserService::new(&pool);

    match service.update_status(&id, payload.status).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            UserResponse::from(user),
            "User status updated successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Marks a user's email as verified.
#[axum::debug_handler]
pub async fn verify_email(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<UserResponse>>, (StatusCode, String)> {
    let service = UserService::new(&pool);

    match service.verify_email(&id).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            UserResponse::from(user),
            "Email verified successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Marks a user's phone number as verified.
#[axum::debug_handler]
pub async fn verify_phone(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<UserResponse>>, (StatusCode, String)> {
    let service = UserService::new(&pool);

    match service.verify_phone(&id).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            UserResponse::from(user),
            "Phone verified successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Soft-deletes a user.
#[axum::debug_handler]
pub async fn delete_user(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<()>>, (StatusCode, String)> {
    let service = UserService::new(&pool);

    match service.delete_user(&id).await {
        Ok(()) => Ok(ResponseJson(ApiResponse::success(
            (),
            "User deleted successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Checks whether a username is taken.
#[axum::debug_handler]
pub async fn check_username(
    Extension(pool): Extension<SqlitePool>,
    Query(query): Query<CheckUsernameQuery>,
) -> Result<ResponseJson<ApiResponse<ExistsResponse>>, (StatusCode, String)> {
    let repo = crate::repositories::user_repository::UserRepository::new(&pool);

    match repo.username_exists(&query.username).await {
        Ok(exists) => {
            let message = if exists {
                "Username already exists"
            } else {
                "Username available"
            };
            Ok(ResponseJson(ApiResponse::success(
                ExistsResponse { exists },
                message,
            )))
        }
        Err(error) => Err(service_error_to_http(error.into())),
    }
}

/// Checks whether an email is taken.
#[axum::debug_handler]
pub async fn check_email(
    Extension(pool): Extension<SqlitePool>,
    Query(query): Query<CheckEmailQuery>,
) -> Result<ResponseJson<ApiResponse<ExistsResponse>>, (StatusCode, String)> {
    let repo = crate::repositories::user_repository::UserRepository::new(&pool);

    match repo.email_exists(&query.email).await {
        Ok(exists) => {
            let message = if exists {
                "Email already exists"
            } else {
                "Email available"
            };
            Ok(ResponseJson(ApiResponse::success(
                ExistsResponse { exists },
                message,
            )))
        }
        Err(error) => Err(service_error_to_http(error.into())),
    }
}

/// Account counts per lifecycle status.
#[axum::debug_handler]
pub async fn statistics(
    Extension(pool): Extension<SqlitePool>,
) -> Result<ResponseJson<ApiResponse<UserStatistics>>, (StatusCode, String)> {
    let service = UserService::new(&pool);

    match service.statistics().await {
        Ok(stats) => Ok(ResponseJson(ApiResponse::success(
            stats,
            "Statistics retrieved successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
