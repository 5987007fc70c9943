//! Auth state and configuration.

use std::sync::Arc;

use crate::api::email::EmailSender;

use super::rate_limit::RateLimiter;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;
const DEFAULT_SESSION_REAP_INTERVAL_SECONDS: u64 = 5 * 60;
const DEFAULT_TWO_FACTOR_TTL_SECONDS: i64 = 10 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    session_ttl_seconds: i64,
    session_reap_interval_seconds: u64,
    two_factor_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_reap_interval_seconds: DEFAULT_SESSION_REAP_INTERVAL_SECONDS,
            two_factor_ttl_seconds: DEFAULT_TWO_FACTOR_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_reap_interval_seconds(mut self, seconds: u64) -> Self {
        self.session_reap_interval_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_two_factor_ttl_seconds(mut self, seconds: i64) -> Self {
        self.two_factor_ttl_seconds = seconds;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(crate) fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(crate) fn session_reap_interval_seconds(&self) -> u64 {
        self.session_reap_interval_seconds
    }

    pub(super) fn two_factor_ttl_seconds(&self) -> i64 {
        self.two_factor_ttl_seconds
    }

    /// Only mark cookies secure when the frontend is served over HTTPS.
    pub(super) fn session_cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

pub struct AuthState {
    config: AuthConfig,
    rate_limiter: Arc<dyn RateLimiter>,
    sender: Arc<dyn EmailSender>,
}

impl AuthState {
    pub fn new(
        config: AuthConfig,
        rate_limiter: Arc<dyn RateLimiter>,
        sender: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            config,
            rate_limiter,
            sender,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(super) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }

    pub(super) fn sender(&self) -> Arc<dyn EmailSender> {
        Arc::clone(&self.sender)
    }
}

#[cfg(test)]
mod tests {
    use super::super::rate_limit::{NoopRateLimiter, RateLimiter};
    use super::{AuthConfig, AuthState};
    use crate::api::email::{EmailSender, LogEmailSender};
    use std::sync::Arc;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new("https://parco.dev".to_string());

        assert_eq!(config.frontend_base_url(), "https://parco.dev");
        assert_eq!(
            config.session_ttl_seconds(),
            super::DEFAULT_SESSION_TTL_SECONDS
        );
        assert_eq!(
            config.two_factor_ttl_seconds(),
            super::DEFAULT_TWO_FACTOR_TTL_SECONDS
        );
        assert!(config.session_cookie_secure());

        let config = config
            .with_session_ttl_seconds(3600)
            .with_session_reap_interval_seconds(60)
            .with_two_factor_ttl_seconds(120);

        assert_eq!(config.session_ttl_seconds(), 3600);
        assert_eq!(config.session_reap_interval_seconds(), 60);
        assert_eq!(config.two_factor_ttl_seconds(), 120);
    }

    #[test]
    fn plain_http_frontend_disables_secure_cookie() {
        let config = AuthConfig::new("http://localhost:5000".to_string());
        assert!(!config.session_cookie_secure());
    }

    #[test]
    fn auth_state_constructs_with_noop_limiter() {
        let config = AuthConfig::new("https://parco.dev".to_string());
        let limiter: Arc<dyn RateLimiter> = Arc::new(NoopRateLimiter);
        let sender: Arc<dyn EmailSender> = Arc::new(LogEmailSender);
        let state = AuthState::new(config, limiter, sender);
        assert_eq!(state.config().frontend_base_url(), "https://parco.dev");
    }
}
