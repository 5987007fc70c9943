//! # Parco (asset-tracker authentication core)
//!
//! `parco` is the authentication and session authority of the Parco IT-asset
//! tracker. It owns the credential store, the email two-factor handshake, and
//! the server-side session records that gate everything else in the product.
//!
//! ## Login flow
//!
//! Authentication is a two-step handshake:
//!
//! 1. `POST /api/auth/login` checks the password (Argon2id) and, on success,
//!    emails a short-lived 6-digit code. No cookie is set at this point.
//! 2. `POST /api/auth/verify-2fa` consumes the code (single use) and only then
//!    mints a session and sets the `HttpOnly` cookie.
//!
//! Wrong email, wrong password, and wrong/expired code are all reported with
//! the same generic messages so accounts cannot be enumerated.
//!
//! ## Sessions
//!
//! Session tokens are 32 random bytes; the database stores only their SHA-256
//! hash. Expired rows are excluded on lookup and swept by a background reaper.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
