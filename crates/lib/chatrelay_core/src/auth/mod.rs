//! Authentication logic.
//!
//! Provides password hashing, bearer token management and credential
//! validation shared by the HTTP layer.

pub mod credentials;
pub mod jwt;
pub mod password;

use thiserror::Error;

pub use jwt::TokenError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
