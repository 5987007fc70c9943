//! Password login and two-factor verification.
//!
//! Login never creates a session. A correct password only stages a short
//! lived emailed code; the session cookie is issued by `verify_two_factor`
//! once that code is consumed.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use crate::api::email::EmailMessage;

use super::{
    password::{equalize_unknown_user, verify_password_blocking},
    rate_limit::{client_ip, RateLimitAction, RateLimitDecision},
    session::session_cookie,
    state::AuthState,
    storage::{
        clear_two_factor_code, consume_two_factor_code, insert_session, lookup_credentials,
        store_two_factor_code,
    },
    types::{LoginRequest, LoginResponse, MessageResponse, UserResponse, VerifyTwoFactorRequest},
    utils::{hash_two_factor_code, normalize_email, valid_email, well_formed_code},
};

pub(super) fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(MessageResponse::new(message))).into_response()
}

fn invalid_credentials() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(MessageResponse::new("Invalid credentials")),
    )
        .into_response()
}

fn verification_failed() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(MessageResponse::new("Verification failed")),
    )
        .into_response()
}

pub(super) fn too_many_attempts() -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(MessageResponse::new("Too many attempts, try again later")),
    )
        .into_response()
}

pub(super) fn service_unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(MessageResponse::new("Service unavailable")),
    )
        .into_response()
}

pub(super) fn rate_limited(
    auth_state: &AuthState,
    headers: &HeaderMap,
    email: &str,
    action: RateLimitAction,
) -> bool {
    let ip = client_ip(headers);
    auth_state.rate_limiter().check_ip(ip.as_deref(), action) == RateLimitDecision::Limited
        || auth_state.rate_limiter().check_email(email, action) == RateLimitDecision::Limited
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Password accepted, code emailed", body = LoginResponse),
        (status = 400, description = "Malformed payload", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse),
        (status = 503, description = "Backend or mail delivery unavailable", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(payload)) = payload else {
        return bad_request("Email and password are required");
    };
    let email = normalize_email(&payload.email);
    if !valid_email(&email) || payload.password.is_empty() {
        return bad_request("Email and password are required");
    }

    if rate_limited(&auth_state, &headers, &email, RateLimitAction::Login) {
        return too_many_attempts();
    }

    let credentials = match lookup_credentials(&pool, &email).await {
        Ok(credentials) => credentials,
        Err(err) => {
            error!("Failed to lookup credentials: {err}");
            return service_unavailable();
        }
    };

    let Some(credentials) = credentials else {
        // Burn comparable work for unknown emails so response timing does
        // not reveal which addresses exist.
        equalize_unknown_user(payload.password).await;
        return invalid_credentials();
    };

    match verify_password_blocking(payload.password, credentials.password_hash).await {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(err) => {
            error!("Password verification failed for stored hash: {err}");
            return invalid_credentials();
        }
    }

    let code = match super::utils::generate_two_factor_code() {
        Ok(code) => code,
        Err(err) => {
            error!("Failed to generate two-factor code: {err}");
            return service_unavailable();
        }
    };
    let code_hash = hash_two_factor_code(&code);
    let ttl_seconds = auth_state.config().two_factor_ttl_seconds();

    if let Err(err) =
        store_two_factor_code(&pool, credentials.user_id, &code_hash, ttl_seconds).await
    {
        error!("Failed to store two-factor code: {err}");
        return service_unavailable();
    }

    let message = two_factor_message(&email, &code, ttl_seconds);
    let sender = auth_state.sender();
    let delivery = tokio::task::spawn_blocking(move || sender.send(&message)).await;
    let delivered = match delivery {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            error!("Failed to send two-factor code: {err}");
            false
        }
        Err(err) => {
            error!("Two-factor send task failed: {err}");
            false
        }
    };
    if !delivered {
        // The code is unusable if the user never received it. Clear it so a
        // later login attempt starts fresh.
        if let Err(err) = clear_two_factor_code(&pool, credentials.user_id).await {
            error!("Failed to clear undelivered two-factor code: {err}");
        }
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(MessageResponse::new("Failed to send verification code")),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(LoginResponse {
            two_factor_required: true,
            email,
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-2fa",
    request_body = VerifyTwoFactorRequest,
    responses(
        (status = 200, description = "Code accepted, session established", body = UserResponse),
        (status = 400, description = "Malformed payload", body = MessageResponse),
        (status = 401, description = "Verification failed", body = MessageResponse),
        (status = 503, description = "Backend unavailable", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn verify_two_factor(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyTwoFactorRequest>>,
) -> impl IntoResponse {
    let Some(Json(payload)) = payload else {
        return bad_request("Email and code are required");
    };
    let email = normalize_email(&payload.email);
    let code = payload.code.trim();
    if email.is_empty() || code.is_empty() {
        return bad_request("Email and code are required");
    }

    if rate_limited(
        &auth_state,
        &headers,
        &email,
        RateLimitAction::VerifyTwoFactor,
    ) {
        return too_many_attempts();
    }

    // Codes not in the emailed shape can never match; skip the database but
    // answer exactly like a mismatch.
    if !valid_email(&email) || !well_formed_code(code) {
        return verification_failed();
    }

    let code_hash = hash_two_factor_code(code);
    let consumed = match consume_two_factor_code(&pool, &email, &code_hash).await {
        Ok(consumed) => consumed,
        Err(err) => {
            error!("Failed to consume two-factor code: {err}");
            return service_unavailable();
        }
    };

    let Some((user_id, email)) = consumed else {
        return verification_failed();
    };

    let token = match insert_session(&pool, user_id, auth_state.config().session_ttl_seconds()).await
    {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to create session: {err}");
            return service_unavailable();
        }
    };

    let mut response_headers = HeaderMap::new();
    match session_cookie(auth_state.config(), &token) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return service_unavailable();
        }
    }

    (
        StatusCode::OK,
        response_headers,
        Json(UserResponse {
            id: user_id.to_string(),
            email,
        }),
    )
        .into_response()
}

fn two_factor_message(email: &str, code: &str, ttl_seconds: i64) -> EmailMessage {
    let minutes = (ttl_seconds / 60).max(1);
    EmailMessage {
        to_email: email.to_string(),
        subject: "Your two-factor access code".to_string(),
        html_body: format!(
            "<p>Your access code is:</p>\
             <p style=\"font-size: 24px; font-weight: bold; letter-spacing: 4px;\">{code}</p>\
             <p>The code expires in {minutes} minutes. If you did not request it, \
             ignore this message.</p>"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_factor_message_carries_code_and_expiry() {
        let message = two_factor_message("user@example.com", "042137", 600);
        assert_eq!(message.to_email, "user@example.com");
        assert!(message.subject.contains("two-factor"));
        assert!(message.html_body.contains("042137"));
        assert!(message.html_body.contains("10 minutes"));
    }

    #[test]
    fn two_factor_message_never_rounds_expiry_to_zero() {
        let message = two_factor_message("user@example.com", "000000", 30);
        assert!(message.html_body.contains("1 minutes"));
    }
}
