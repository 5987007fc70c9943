use axum::{extract::Extension, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use tracing::error;

use crate::GIT_COMMIT_HASH;

/// Liveness probe that also verifies database connectivity.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are reachable", body = String),
        (status = 503, description = "Database unreachable")
    ),
    tag = "health"
)]
pub async fn health(pool: Extension<PgPool>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(&*pool).await {
        Ok(_) => (StatusCode::OK, GIT_COMMIT_HASH.to_string()).into_response(),
        Err(err) => {
            error!("Health check database ping failed: {err}");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}
