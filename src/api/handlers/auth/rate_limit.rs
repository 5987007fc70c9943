//! Rate limiting primitives for auth flows.
//!
//! No lockout policy ships by default; deployments plug a real limiter in
//! through this trait without touching the handlers.

use axum::http::HeaderMap;

#[derive(Clone, Copy, Debug)]
pub enum RateLimitAction {
    Register,
    Login,
    VerifyTwoFactor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

pub trait RateLimiter: Send + Sync {
    fn check_ip(&self, ip: Option<&str>, action: RateLimitAction) -> RateLimitDecision;
    fn check_email(&self, email: &str, action: RateLimitAction) -> RateLimitDecision;
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_ip(&self, _ip: Option<&str>, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }

    fn check_email(&self, _email: &str, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

/// Best-effort client address for limiter keys.
///
/// Trusts the first `X-Forwarded-For` hop, which is only meaningful behind
/// a proxy that overwrites the header.
pub(super) fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = forwarded.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}
