//! Authentication service: register/login flows delegating to `chatrelay_core::auth`.

use chatrelay_core::auth::credentials::{normalize_email, validate_email, validate_password};
use chatrelay_core::auth::jwt::issue_token;
use chatrelay_core::auth::password::{hash_password, verify_password};
use chatrelay_core::store::{CredentialStore, StoreError};
use chrono::Duration;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::TokenResponse;

/// Register a new user account.
///
/// Fails with a validation error on a malformed email or short password and
/// with a conflict when the email is already registered.
pub async fn register(store: &dyn CredentialStore, email: &str, password: &str) -> AppResult<()> {
    let email = normalize_email(email);
    validate_email(&email)?;
    validate_password(password)?;

    if store.find_user(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let pw_hash = hash_password(password)?;
    match store.create_user(&email, &pw_hash).await {
        Ok(()) => {}
        // Lost a race with a concurrent registration.
        Err(StoreError::Duplicate) => {
            return Err(AppError::Conflict("Email already registered".into()));
        }
        Err(e) => return Err(e.into()),
    }

    info!(%email, "user registered");
    Ok(())
}

/// Authenticate with email + password and issue a bearer token.
///
/// Unknown emails and wrong passwords produce the same error.
pub async fn login(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
    jwt_secret: &[u8],
    token_ttl: Duration,
) -> AppResult<TokenResponse> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let user = store
        .find_user(&email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = issue_token(&user.email, jwt_secret, token_ttl)?;
    info!(email = %user.email, "user logged in");
    Ok(TokenResponse { token })
}

#[cfg(test)]
mod tests {
    use chatrelay_core::auth::jwt::verify_token;
    use chatrelay_core::store::memory::MemoryCredentialStore;

    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[tokio::test]
    async fn register_then_login() {
        let store = MemoryCredentialStore::default();
        register(&store, " Alice@Example.com ", "password123").await.unwrap();

        let resp = login(&store, "alice@example.com", "password123", SECRET, Duration::hours(1))
            .await
            .unwrap();
        let claims = verify_token(&resp.token, SECRET).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let store = MemoryCredentialStore::default();
        register(&store, "a@example.com", "password123").await.unwrap();
        let err = register(&store, "A@example.com", "password456").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn bad_input_is_a_validation_error() {
        let store = MemoryCredentialStore::default();
        assert!(matches!(
            register(&store, "not-an-email", "password123").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            register(&store, "a@example.com", "short").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let store = MemoryCredentialStore::default();
        register(&store, "a@example.com", "password123").await.unwrap();

        let wrong = login(&store, "a@example.com", "nope-nope", SECRET, Duration::hours(1))
            .await
            .unwrap_err();
        let unknown = login(&store, "b@example.com", "password123", SECRET, Duration::hours(1))
            .await
            .unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, AppError::Unauthorized(_)));
    }
}
