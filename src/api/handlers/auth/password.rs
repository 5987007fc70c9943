//! Argon2id password hashing.
//!
//! Hashing is deliberately slow, so the async wrappers run it on the blocking
//! thread pool; handlers must never run Argon2 directly on a runtime worker.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::OnceLock;

/// Single construction point for the hasher; cost parameters are tuned here.
fn hasher() -> Argon2<'static> {
    Argon2::default()
}

/// Hash a password with a fresh random salt, producing a PHC string.
pub(super) fn hash_password(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|err| anyhow!("password hashing failed: {err}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string.
///
/// A mismatch is `false`, never an error; only a malformed stored hash errors.
pub(super) fn verify_password(plaintext: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|err| anyhow!("invalid stored hash: {err}"))?;
    Ok(hasher()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok())
}

/// `hash_password` on the blocking pool.
pub(super) async fn hash_password_blocking(plaintext: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plaintext))
        .await
        .context("password hashing task failed")?
}

/// `verify_password` on the blocking pool.
pub(super) async fn verify_password_blocking(plaintext: String, stored: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plaintext, &stored))
        .await
        .context("password verification task failed")?
}

/// Burn the same Argon2 work for unknown emails as for known ones, so login
/// timing does not reveal whether an account exists.
pub(super) async fn equalize_unknown_user(plaintext: String) {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();

    let stored = DUMMY_HASH
        .get_or_init(|| {
            hash_password("parco-dummy-password").unwrap_or_else(|_| String::from("invalid"))
        })
        .clone();

    let _ = tokio::task::spawn_blocking(move || {
        let _ = verify_password(&plaintext, &stored);
    })
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("Secret123!").expect("hashing should succeed");
        assert!(verify_password("Secret123!", &hash).expect("verify should not error"));
        assert!(!verify_password("Secret123", &hash).expect("verify should not error"));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let first = hash_password("same_password").expect("hashing should succeed");
        let second = hash_password("same_password").expect("hashing should succeed");
        assert_ne!(first, second);
        assert!(verify_password("same_password", &first).expect("verify should not error"));
        assert!(verify_password("same_password", &second).expect("verify should not error"));
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[tokio::test]
    async fn blocking_wrappers_round_trip() {
        let hash = hash_password_blocking("Secret123!".to_string())
            .await
            .expect("hashing should succeed");
        let ok = verify_password_blocking("Secret123!".to_string(), hash)
            .await
            .expect("verify should not error");
        assert!(ok);
    }

    #[tokio::test]
    async fn equalize_unknown_user_completes() {
        equalize_unknown_user("whatever".to_string()).await;
    }
}
