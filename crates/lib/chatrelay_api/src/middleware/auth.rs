//! Authentication middleware: Bearer token extraction and JWT verification.
//!
//! One middleware serves every protected route group; the group's
//! [`AuthPolicy`] decides whether a missing token is acceptable.

use std::fmt;
use std::str::FromStr;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chatrelay_core::auth::jwt::verify_token;
use chatrelay_core::models::auth::TokenClaims;
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};

/// Authorization requirement of a route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// A valid bearer token must be present.
    Required,
    /// Anonymous callers are let through; a token, if sent, must be valid.
    Optional,
}

impl FromStr for AuthPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "required" => Ok(AuthPolicy::Required),
            "optional" => Ok(AuthPolicy::Optional),
            other => Err(format!(
                "unknown auth policy {other:?} (expected \"required\" or \"optional\")"
            )),
        }
    }
}

impl fmt::Display for AuthPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthPolicy::Required => f.write_str("required"),
            AuthPolicy::Optional => f.write_str("optional"),
        }
    }
}

/// Identity attached to every request passing through [`authenticate`].
#[derive(Debug, Clone)]
pub enum Caller {
    Anonymous,
    User(TokenClaims),
}

impl Caller {
    /// Token subject (the user's email), if authenticated.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Caller::Anonymous => None,
            Caller::User(claims) => Some(&claims.sub),
        }
    }

    /// The user a request acts for: the token subject, else a non-blank
    /// client-supplied id.
    pub fn resolve_user_id(&self, supplied: Option<&str>) -> AppResult<String> {
        if let Some(sub) = self.subject() {
            return Ok(sub.to_string());
        }
        supplied
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("user_id is required".into()))
    }
}

/// Axum middleware: reads `Authorization: Bearer <token>`, verifies it and
/// inserts a [`Caller`] into request extensions.
pub async fn authenticate(
    State((state, policy)): State<(AppState, AuthPolicy)>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|v| {
            v.to_str()
                .map_err(|_| AppError::Unauthorized("Invalid authorization header".into()))
        })
        .transpose()?;

    let caller = match header {
        None if policy == AuthPolicy::Optional => Caller::Anonymous,
        None => {
            return Err(AppError::Unauthorized(
                "Missing authorization header".into(),
            ));
        }
        Some(value) => {
            let token = value
                .strip_prefix("Bearer ")
                .ok_or_else(|| AppError::Unauthorized("Invalid authorization scheme".into()))?;
            let claims = verify_token(token.trim(), state.config.jwt_secret.as_bytes())?;
            debug!(sub = %claims.sub, "bearer token accepted");
            Caller::User(claims)
        }
    };

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}
