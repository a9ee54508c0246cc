//! Credential and conversation persistence.
//!
//! Both stores are traits so the application can run against PostgreSQL
//! ([`postgres`]) or process memory ([`memory`]). [`Stores`] bundles one of
//! each for injection into the HTTP layer.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::auth::UserWithPassword;
use crate::models::chat::{Conversation, Message};

/// Errors raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email already registered")]
    Duplicate,

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Lookup and creation of user credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch a user by (normalized) email.
    async fn find_user(&self, email: &str) -> Result<Option<UserWithPassword>, StoreError>;

    /// Create a user. Fails with [`StoreError::Duplicate`] when the email exists.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<(), StoreError>;
}

/// Saved chat transcripts keyed by `(user_id, chat_id)`.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Insert or overwrite the conversation, stamping `saved_at` with now.
    async fn save(
        &self,
        user_id: &str,
        chat_id: &str,
        messages: &[Message],
    ) -> Result<Conversation, StoreError>;

    /// All conversations of a user, most recently saved first.
    async fn list(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError>;

    /// Delete every conversation of a user, returning how many were removed.
    async fn delete_all(&self, user_id: &str) -> Result<u64, StoreError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Reject saves with a missing user id, chat id or message list.
pub fn validate_save(user_id: &str, chat_id: &str, messages: &[Message]) -> Result<(), StoreError> {
    if user_id.trim().is_empty() {
        return Err(StoreError::Validation("user_id is required".into()));
    }
    if chat_id.trim().is_empty() {
        return Err(StoreError::Validation("chat_id is required".into()));
    }
    if messages.is_empty() {
        return Err(StoreError::Validation("history must not be empty".into()));
    }
    Ok(())
}

/// The stores an application instance runs against.
#[derive(Clone)]
pub struct Stores {
    pub credentials: Arc<dyn CredentialStore>,
    pub conversations: Arc<dyn ConversationStore>,
    /// Backend name for logs and health output.
    pub backend: &'static str,
}

impl Stores {
    /// Stores backed by a PostgreSQL pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            credentials: Arc::new(postgres::PgCredentialStore::new(pool.clone())),
            conversations: Arc::new(postgres::PgConversationStore::new(pool)),
            backend: "postgres",
        }
    }

    /// Process-local stores; contents are lost on restart.
    pub fn memory() -> Self {
        Self {
            credentials: Arc::new(memory::MemoryCredentialStore::default()),
            conversations: Arc::new(memory::MemoryConversationStore::default()),
            backend: "memory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_requires_all_inputs() {
        let msgs = vec![Message::user("hi")];
        assert!(validate_save("u", "c", &msgs).is_ok());
        assert!(matches!(validate_save("", "c", &msgs), Err(StoreError::Validation(_))));
        assert!(matches!(validate_save("u", " ", &msgs), Err(StoreError::Validation(_))));
        assert!(matches!(validate_save("u", "c", &[]), Err(StoreError::Validation(_))));
    }
}
