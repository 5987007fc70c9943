//! Account registration.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};

use super::{
    login::{bad_request, rate_limited, service_unavailable, too_many_attempts},
    password::hash_password_blocking,
    rate_limit::RateLimitAction,
    state::AuthState,
    storage::{insert_user, RegisterOutcome},
    types::{MessageResponse, RegisterRequest, UserResponse},
    utils::{normalize_email, valid_email},
};

const MIN_PASSWORD_LEN: usize = 8;

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Malformed payload", body = MessageResponse),
        (status = 409, description = "Email already registered", body = MessageResponse),
        (status = 503, description = "Backend unavailable", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let Some(Json(payload)) = payload else {
        return bad_request("Email and password are required");
    };
    let email = normalize_email(&payload.email);
    if !valid_email(&email) {
        return bad_request("A valid email is required");
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return bad_request("Password must be at least 8 characters");
    }

    if rate_limited(&auth_state, &headers, &email, RateLimitAction::Register) {
        return too_many_attempts();
    }

    let password_hash = match hash_password_blocking(payload.password).await {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {err}");
            return service_unavailable();
        }
    };

    match insert_user(&pool, &email, &password_hash).await {
        Ok(RegisterOutcome::Created { user_id }) => {
            info!(email = %email, "registered new account");
            (
                StatusCode::CREATED,
                Json(UserResponse {
                    id: user_id.to_string(),
                    email,
                }),
            )
                .into_response()
        }
        Ok(RegisterOutcome::Conflict) => (
            StatusCode::CONFLICT,
            Json(MessageResponse::new("Email already registered")),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to insert user: {err}");
            service_unavailable()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_length_counts_chars_not_bytes() {
        let short = "pässwrd";
        assert!(short.chars().count() < MIN_PASSWORD_LEN);
        assert!(short.len() >= MIN_PASSWORD_LEN);
    }
}
