use axum::{
    extract::Extension, http::HeaderMap, response::IntoResponse, Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use super::auth::{
    principal::require_auth,
    types::{MessageResponse, UserResponse},
    AuthState,
};

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current authenticated user", body = UserResponse),
        (status = 401, description = "No live session", body = MessageResponse),
        (status = 503, description = "Session store unavailable", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn me(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    match require_auth(&headers, &pool, &auth_state).await {
        Ok(principal) => Json(UserResponse {
            id: principal.user_id.to_string(),
            email: principal.email,
        })
        .into_response(),
        Err(response) => response,
    }
}
