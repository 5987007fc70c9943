use axum::{http::HeaderMap, response::Response};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    login::service_unavailable,
    session::{authenticate_session, unauthorized_response},
    state::AuthState,
};

/// The authenticated user behind a request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
}

/// Require a live session or produce the response the client should get.
///
/// A missing cookie and an expired or unknown session get the same generic
/// 401 with the stale cookie cleared so clients stop resending it. A store
/// failure is not an authentication verdict: it maps to 503 and the cookie
/// is left alone, since the session may well still be valid.
pub(crate) async fn require_auth(
    headers: &HeaderMap,
    pool: &PgPool,
    auth_state: &AuthState,
) -> Result<Principal, Response> {
    match authenticate_session(headers, pool).await {
        Ok(Some(record)) => Ok(Principal {
            user_id: record.user_id,
            email: record.email,
        }),
        Ok(None) => Err(unauthorized_response(
            auth_state.config(),
            "Not authenticated",
        )),
        Err(_) => Err(service_unavailable()),
    }
}
