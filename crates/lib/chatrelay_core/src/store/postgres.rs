//! PostgreSQL stores.
//!
//! Conversations are stored as one JSONB document per `(user_id, chat_id)`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use uuid::Uuid;

use super::{ConversationStore, CredentialStore, StoreError, validate_save};
use crate::models::auth::UserWithPassword;
use crate::models::chat::{Conversation, Message};
use crate::uuid::uuidv7;

/// Open a connection pool, bounding how long acquiring a connection may take.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
}

/// Row returned by conversation queries.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ConversationRow {
    id: Uuid,
    user_id: String,
    chat_id: String,
    messages: Json<Vec<Message>>,
    saved_at: DateTime<Utc>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Conversation {
            id: row.id.to_string(),
            user_id: row.user_id,
            chat_id: row.chat_id,
            messages: row.messages.0,
            saved_at: row.saved_at,
        }
    }
}

/// Credentials in the `users` table.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_user(&self, email: &str) -> Result<Option<UserWithPassword>, StoreError> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(email, password_hash)| UserWithPassword {
            email,
            password_hash,
        }))
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> Result<(), StoreError> {
        let result = sqlx::query("INSERT INTO users (email, password_hash) VALUES ($1, $2)")
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool)
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Conversations in the `conversations` table.
#[derive(Debug, Clone)]
pub struct PgConversationStore {
    pool: PgPool,
}

impl PgConversationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn save(
        &self,
        user_id: &str,
        chat_id: &str,
        messages: &[Message],
    ) -> Result<Conversation, StoreError> {
        validate_save(user_id, chat_id, messages)?;

        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            INSERT INTO conversations (id, user_id, chat_id, messages, saved_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, chat_id)
            DO UPDATE SET messages = EXCLUDED.messages, saved_at = EXCLUDED.saved_at
            RETURNING id, user_id, chat_id, messages, saved_at
            "#,
        )
        .bind(uuidv7())
        .bind(user_id)
        .bind(chat_id)
        .bind(Json(messages.to_vec()))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError> {
        let rows = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, user_id, chat_id, messages, saved_at
            FROM conversations
            WHERE user_id = $1
            ORDER BY saved_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Conversation::from).collect())
    }

    async fn delete_all(&self, user_id: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM conversations WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
