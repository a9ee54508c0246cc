//! JWT bearer token issuing and verification.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::auth::TokenClaims;

/// Default token lifetime in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Longest accepted token lifetime in hours (ten years).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

/// Token verification and signing failures.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("jwt encode: {0}")]
    Encode(String),
}

/// Issue a signed HS256 token for `subject`, valid for `ttl` from now.
pub fn issue_token(subject: &str, secret: &[u8], ttl: Duration) -> Result<String, TokenError> {
    issue_token_at(subject, secret, Utc::now(), ttl)
}

/// Issue a token as if it were minted at `issued_at`.
pub fn issue_token_at(
    subject: &str,
    secret: &[u8],
    issued_at: DateTime<Utc>,
    ttl: Duration,
) -> Result<String, TokenError> {
    if ttl <= Duration::zero() {
        return Err(TokenError::Encode("token lifetime must be positive".into()));
    }
    let expires_at = issued_at
        .checked_add_signed(ttl)
        .ok_or_else(|| TokenError::Encode("token expiry is out of range".into()))?;
    let claims = TokenClaims {
        sub: subject.to_string(),
        iat: issued_at.timestamp(),
        exp: expires_at.timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| TokenError::Encode(e.to_string()))
}

/// Verify signature and expiry, returning the claims on success.
///
/// Expiry is checked without leeway.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<TokenClaims, TokenError> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
}

/// Resolve the signing secret: explicit value → `JWT_SECRET` → `SECRET_KEY`
/// → persisted file under the platform data directory.
pub fn resolve_jwt_secret(explicit: Option<&str>) -> String {
    if let Some(secret) = explicit
        && !secret.is_empty()
    {
        return secret.to_string();
    }
    for var in ["JWT_SECRET", "SECRET_KEY"] {
        if let Ok(secret) = std::env::var(var)
            && !secret.is_empty()
        {
            return secret;
        }
    }
    load_or_generate_secret(&jwt_secret_path())
}

/// Read a persisted secret from `path`, generating and persisting a new
/// 64-character one when the file is missing or blank.
pub fn load_or_generate_secret(path: &Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match std::fs::write(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new JWT secret"),
        Err(e) => warn!(path = %path.display(), "could not persist JWT secret: {e}"),
    }
    secret
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatrelay")
        .join("jwt-secret")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn issue_then_verify_returns_subject() {
        let token = issue_token("alice@example.com", SECRET, Duration::hours(24)).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let issued = Utc::now() - Duration::hours(2);
        let token = issue_token_at("alice@example.com", SECRET, issued, Duration::hours(1)).unwrap();
        assert!(matches!(verify_token(&token, SECRET), Err(TokenError::Expired)));
    }

    #[test]
    fn non_positive_lifetime_is_refused() {
        for ttl in [Duration::zero(), Duration::hours(-1)] {
            assert!(matches!(
                issue_token("alice@example.com", SECRET, ttl),
                Err(TokenError::Encode(_))
            ));
        }
    }

    #[test]
    fn overflowing_lifetime_is_an_error_not_a_panic() {
        let ttl = Duration::hours(10_000_000_000);
        assert!(matches!(
            issue_token("alice@example.com", SECRET, ttl),
            Err(TokenError::Encode(_))
        ));
    }

    #[test]
    fn longest_accepted_lifetime_still_issues() {
        let ttl = Duration::hours(MAX_TOKEN_TTL_HOURS);
        let token = issue_token("alice@example.com", SECRET, ttl).unwrap();
        assert_eq!(verify_token(&token, SECRET).unwrap().sub, "alice@example.com");
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = issue_token("alice@example.com", SECRET, Duration::hours(1)).unwrap();
        assert!(matches!(
            verify_token(&token, b"other-secret"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(verify_token("not.a.jwt", SECRET), Err(TokenError::Invalid)));
        assert!(matches!(verify_token("", SECRET), Err(TokenError::Invalid)));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let token = issue_token("alice@example.com", SECRET, Duration::hours(1)).unwrap();
        let other = issue_token("mallory@example.com", SECRET, Duration::hours(1)).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);
        assert!(matches!(verify_token(&forged, SECRET), Err(TokenError::Invalid)));
    }

    #[test]
    fn explicit_secret_wins() {
        assert_eq!(resolve_jwt_secret(Some("from-flag")), "from-flag");
    }

    #[test]
    fn generated_secret_is_persisted_and_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jwt-secret");

        let first = load_or_generate_secret(&path);
        assert_eq!(first.len(), 64);
        assert!(path.exists());

        let second = load_or_generate_secret(&path);
        assert_eq!(first, second);
    }
}
