//! Defines the HTTP routes for user registration and profile management.
//!
//! Registration and existence checks are public; everything else sits
//! behind the bearer-token gate.

use super::handlers::*;
use crate::auth::middleware::jwt_auth;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

/// Creates the user router with all user-related routes
pub fn user_router() -> Router {
    let public = Router::new()
        .route("/", post(create_user))
        .route("/check-username", get(check_username))
        .route("/check-email", get(check_email));

    let protected = Router::new()
        .route("/", get(list_users))
        .route("/statistics", get(statistics))
        .route("/username/{username}", get(get_user_by_username))
        .route(
            "/{id}",
            get(get_user_by_id).put(update_user).delete(delete_user),
        )
        .route("/{id}/password", put(update_password))
        .route("/{id}/status", put(update_status))
        .route("/{id}/verify-email", put(verify_email))
        .route("/{id}/verify-phone", put(verify_phone))
        .route_layer(middleware::from_fn(jwt_auth));

    public.merge(protected)
}
