//! Application error types.

use std::fmt::Display;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chatrelay_core::auth::{AuthError, TokenError};
use chatrelay_core::store::StoreError;
use thiserror::Error;
use tracing::error;

use crate::config::ErrorDisclosure;
use crate::models::ErrorResponse;

/// Message shown for provider failures under [`ErrorDisclosure::Generic`].
pub const GENERIC_UPSTREAM_MESSAGE: &str = "Failed to get a reply from the model";

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database unavailable: {0}")]
    DbUnavailable(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Log a model-provider failure and build the client-facing error
    /// according to `disclosure`.
    pub fn upstream(disclosure: ErrorDisclosure, err: impl Display) -> Self {
        error!(error = %err, "model provider call failed");
        match disclosure {
            ErrorDisclosure::Generic => AppError::Upstream(GENERIC_UPSTREAM_MESSAGE.into()),
            ErrorDisclosure::Verbose => AppError::Upstream(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.as_str()),
            AppError::DbUnavailable(m) => {
                (StatusCode::SERVICE_UNAVAILABLE, "db_unavailable", m.as_str())
            }
            AppError::Upstream(m) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "upstream_error", m.as_str())
            }
            AppError::Internal(detail) => {
                error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(msg) => AppError::Validation(msg),
            StoreError::Duplicate => AppError::Conflict("Email already registered".into()),
            StoreError::Db(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired | TokenError::Invalid => AppError::Unauthorized(e.to_string()),
            TokenError::Encode(msg) => AppError::Internal(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialError => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::Token(e) => AppError::from(e),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
