//! Health-check handlers.
//!
//! Reports overall service health with per-component detail. The endpoint
//! always answers 200; the body's `status` field carries the verdict.

use axum::{extract::Extension, response::Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthComponents {
    pub database: ComponentHealth,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub components: HealthComponents,
}

/// Basic health check covering the database connection.
#[axum::debug_handler]
pub async fn health(Extension(pool): Extension<SqlitePool>) -> Json<HealthResponse> {
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&pool).await {
        Ok(_) => ComponentHealth { status: "UP" },
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            ComponentHealth { status: "DOWN" }
        }
    };

    let status = if database.status == "UP" { "UP" } else { "DOWN" };

    Json(HealthResponse {
        status,
        timestamp: Utc::now(),
        components: HealthComponents { database },
    })
}
