//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle user login and credential validation and are
//! designed to be nested under `/api/auth` in the main Axum router.

use crate::auth::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/validate", post(validate_credentials))
        .route("/status", get(status))
}
