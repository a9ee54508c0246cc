//! Chat model providers.
//!
//! The orchestrator talks to the model through [`ChatProvider`] so the HTTP
//! layer can be exercised with a stub. [`openai::OpenAiProvider`] is the
//! production implementation.

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::chat::Message;

/// Errors that can occur while asking the model for a reply.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response parse error: {0}")]
    Decode(String),

    #[error("Provider returned no reply")]
    EmptyReply,
}

/// A chat completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Send the ordered message list and return the first choice's text.
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;
}
