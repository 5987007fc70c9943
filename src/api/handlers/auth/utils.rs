//! Small helpers for auth validation and token/code handling.

use anyhow::{Context, Result};
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Length of the emailed two-factor code.
pub(super) const TWO_FACTOR_CODE_LEN: usize = 6;

/// Normalize an email for lookup/uniqueness checks.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        // The pattern is a literal; a failure here is a programming error.
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern must compile")
    });
    regex.is_match(email_normalized)
}

/// Create a new session token for the auth cookie.
/// The raw value is only returned to set the cookie; the database stores a hash.
pub(crate) fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a session token so raw values never touch the database.
/// The hash is used for lookups when the cookie is presented.
pub(crate) fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Create a new 6-digit two-factor code from the OS CSPRNG.
pub(super) fn generate_two_factor_code() -> Result<String> {
    let mut bytes = [0u8; 8];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate two-factor code")?;
    Ok(code_from_entropy(u64::from_be_bytes(bytes)))
}

/// Reduce 64 random bits to a 6-digit code.
///
/// Reducing from the full u64 range keeps the modulo bias below 2^-44 per
/// code, far past anything observable.
fn code_from_entropy(entropy: u64) -> String {
    let value = entropy % 1_000_000;
    format!("{value:06}")
}

/// Hash a two-factor code before storing or matching it.
/// Codes are matched by hash equality in SQL, never as raw strings.
pub(super) fn hash_two_factor_code(code: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hasher.finalize().to_vec()
}

/// True when the supplied code has the exact emailed shape: 6 ASCII digits.
pub(super) fn well_formed_code(code: &str) -> bool {
    code.len() == TWO_FACTOR_CODE_LEN && code.bytes().all(|byte| byte.is_ascii_digit())
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn generate_session_token_has_full_entropy() {
        let decoded_len = generate_session_token()
            .ok()
            .and_then(|token| URL_SAFE_NO_PAD.decode(token.as_bytes()).ok())
            .map(|bytes| bytes.len());
        assert_eq!(decoded_len, Some(32));
    }

    #[test]
    fn hash_session_token_stable() {
        let first = hash_session_token("token");
        let second = hash_session_token("token");
        let different = hash_session_token("other");
        assert_eq!(first, second);
        assert_ne!(first, different);
    }

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..32 {
            let code = generate_two_factor_code().expect("code generation should succeed");
            assert!(well_formed_code(&code), "bad code shape: {code}");
        }
    }

    #[test]
    fn code_reduction_covers_the_full_entropy_range() {
        assert_eq!(code_from_entropy(0), "000000");
        assert_eq!(code_from_entropy(999_999), "999999");
        assert_eq!(code_from_entropy(1_000_000), "000000");
        let top = u64::MAX % 1_000_000;
        assert_eq!(code_from_entropy(u64::MAX), format!("{top:06}"));
    }

    #[test]
    fn valid_email_is_stable_across_calls() {
        // The compiled pattern is cached; repeated calls must agree.
        for _ in 0..3 {
            assert!(valid_email("a@example.com"));
            assert!(!valid_email("a@example com"));
        }
    }

    #[test]
    fn well_formed_code_rejects_other_shapes() {
        assert!(!well_formed_code(""));
        assert!(!well_formed_code("12345"));
        assert!(!well_formed_code("1234567"));
        assert!(!well_formed_code("12345a"));
        assert!(!well_formed_code("123 45"));
    }

    #[test]
    fn code_hash_matches_only_exact_code() {
        let stored = hash_two_factor_code("042137");
        assert_eq!(stored, hash_two_factor_code("042137"));
        assert_ne!(stored, hash_two_factor_code("042138"));
    }

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }
}
