//! Authentication domain models.
//!
//! These are internal domain models, distinct from the request/response
//! bodies of the HTTP layer.

use serde::{Deserialize, Serialize};

/// User with password hash (for internal auth flows).
#[derive(Debug, Clone)]
pub struct UserWithPassword {
    pub email: String,
    pub password_hash: String,
}

/// JWT claims embedded in bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user's email (standard JWT `sub` claim).
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}
