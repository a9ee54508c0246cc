//! API configuration.

use std::fmt;
use std::str::FromStr;

use chatrelay_core::auth::jwt::DEFAULT_TOKEN_TTL_HOURS;
use chrono::Duration;

use crate::middleware::auth::AuthPolicy;

/// How much of a model-provider failure is shown to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorDisclosure {
    /// A fixed message; the raw error is only logged.
    #[default]
    Generic,
    /// The raw provider error text is returned to the client.
    Verbose,
}

impl FromStr for ErrorDisclosure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" => Ok(ErrorDisclosure::Generic),
            "verbose" => Ok(ErrorDisclosure::Verbose),
            other => Err(format!(
                "unknown error disclosure {other:?} (expected \"generic\" or \"verbose\")"
            )),
        }
    }
}

impl fmt::Display for ErrorDisclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDisclosure::Generic => f.write_str("generic"),
            ErrorDisclosure::Verbose => f.write_str("verbose"),
        }
    }
}

/// Configuration for the API router.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Lifetime of issued bearer tokens.
    pub token_ttl: Duration,
    /// Provider error disclosure.
    pub error_disclosure: ErrorDisclosure,
    /// Authorization requirement for `/chat`.
    pub chat_auth: AuthPolicy,
    /// Authorization requirement for `/save-chat`, `/get-conversations` and `/new-chat`.
    pub conversations_auth: AuthPolicy,
    /// Whether `/chat` stores each successful exchange.
    pub persist_chats: bool,
}

impl ApiConfig {
    /// Configuration with default policies for the given signing secret.
    ///
    /// | Setting              | Default    |
    /// |----------------------|------------|
    /// | `token_ttl`          | 24 hours   |
    /// | `error_disclosure`   | `generic`  |
    /// | `chat_auth`          | `optional` |
    /// | `conversations_auth` | `required` |
    /// | `persist_chats`      | `true`     |
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            error_disclosure: ErrorDisclosure::Generic,
            chat_auth: AuthPolicy::Optional,
            conversations_auth: AuthPolicy::Required,
            persist_chats: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disclosure_parses() {
        assert_eq!("generic".parse(), Ok(ErrorDisclosure::Generic));
        assert_eq!(" Verbose ".parse(), Ok(ErrorDisclosure::Verbose));
        assert!("loud".parse::<ErrorDisclosure>().is_err());
    }

    #[test]
    fn defaults() {
        let config = ApiConfig::new("s");
        assert_eq!(config.token_ttl, Duration::hours(24));
        assert_eq!(config.chat_auth, AuthPolicy::Optional);
        assert_eq!(config.conversations_auth, AuthPolicy::Required);
        assert_eq!(config.error_disclosure, ErrorDisclosure::Generic);
    }
}
