//! Defines the HTTP routes for health probes.

use super::handlers::health;
use axum::{Router, routing::get};

/// Creates the health-check router
pub fn health_router() -> Router {
    Router::new().route("/health", get(health))
}
