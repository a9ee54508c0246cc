//! Request and response bodies of the HTTP API.
//!
//! Request fields default when absent so that missing input is reported as a
//! validation error (400) by the services rather than a body rejection.

use chatrelay_core::models::chat::Conversation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Stable machine-readable kind, e.g. `validation_error`.
    pub code: String,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `POST /register` and `POST /login` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// `POST /login` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// `POST /chat` body. `history` is taken as raw JSON and normalized.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub message: String,
    pub history: Value,
    pub user_id: Option<String>,
    pub chat_id: Option<String>,
}

/// `POST /chat` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub chat_id: String,
}

/// `POST /save-chat` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SaveChatRequest {
    pub user_id: Option<String>,
    pub chat_id: Option<String>,
    pub history: Value,
}

/// `POST /save-chat` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveChatResponse {
    pub message: String,
    /// Storage id of the saved conversation.
    pub id: String,
}

/// `GET /get-conversations` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationsQuery {
    pub user_id: Option<String>,
}

/// `GET /get-conversations` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<Conversation>,
}

/// `POST /new-chat` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewChatRequest {
    pub user_id: Option<String>,
}

/// `POST /new-chat` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChatResponse {
    pub message: String,
    pub deleted: u64,
}

/// `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `connected`, `unreachable` or `disabled`.
    pub store: String,
}
