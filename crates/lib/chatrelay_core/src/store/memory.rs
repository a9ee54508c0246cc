//! In-memory stores backed by `DashMap`.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{ConversationStore, CredentialStore, StoreError, validate_save};
use crate::models::auth::UserWithPassword;
use crate::models::chat::{Conversation, Message};
use crate::uuid::uuidv7;

/// Credentials keyed by email.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: DashMap<String, String>,
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_user(&self, email: &str) -> Result<Option<UserWithPassword>, StoreError> {
        Ok(self.users.get(email).map(|hash| UserWithPassword {
            email: email.to_string(),
            password_hash: hash.value().clone(),
        }))
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> Result<(), StoreError> {
        match self.users.entry(email.to_string()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(password_hash.to_string());
                Ok(())
            }
        }
    }
}

/// Conversations keyed by `(user_id, chat_id)`.
#[derive(Debug, Default)]
pub struct MemoryConversationStore {
    conversations: DashMap<(String, String), Conversation>,
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn save(
        &self,
        user_id: &str,
        chat_id: &str,
        messages: &[Message],
    ) -> Result<Conversation, StoreError> {
        validate_save(user_id, chat_id, messages)?;

        let now = Utc::now();
        let key = (user_id.to_string(), chat_id.to_string());
        let saved = match self.conversations.entry(key) {
            Entry::Occupied(mut existing) => {
                let conv = existing.get_mut();
                conv.messages = messages.to_vec();
                conv.saved_at = now;
                conv.clone()
            }
            Entry::Vacant(slot) => slot
                .insert(Conversation {
                    id: uuidv7().to_string(),
                    user_id: user_id.to_string(),
                    chat_id: chat_id.to_string(),
                    messages: messages.to_vec(),
                    saved_at: now,
                })
                .clone(),
        };
        Ok(saved)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError> {
        let mut found: Vec<Conversation> = self
            .conversations
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn delete_all(&self, user_id: &str) -> Result<u64, StoreError> {
        let keys: Vec<(String, String)> = self
            .conversations
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.key().clone())
            .collect();
        let removed = keys
            .iter()
            .filter(|key| self.conversations.remove(*key).is_some())
            .count();
        Ok(removed as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> Vec<Message> {
        vec![Message::user("hi"), Message::assistant("hello!")]
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryCredentialStore::default();
        store.create_user("a@example.com", "hash").await.unwrap();
        assert!(matches!(
            store.create_user("a@example.com", "other").await,
            Err(StoreError::Duplicate)
        ));
        let user = store.find_user("a@example.com").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "hash");
        assert!(store.find_user("b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_list() {
        let store = MemoryConversationStore::default();
        let before = Utc::now();
        store.save("u", "c1", &transcript()).await.unwrap();

        let listed = store.list("u").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].chat_id, "c1");
        assert_eq!(listed[0].messages, transcript());
        assert!(listed[0].saved_at >= before);
        assert!(!listed[0].id.is_empty());
    }

    #[tokio::test]
    async fn save_overwrites_same_chat_and_keeps_id() {
        let store = MemoryConversationStore::default();
        let first = store.save("u", "c1", &transcript()).await.unwrap();
        let replacement = vec![Message::user("again")];
        let second = store.save("u", "c1", &replacement).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.saved_at >= first.saved_at);
        let listed = store.list("u").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].messages, replacement);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_scoped_to_user() {
        let store = MemoryConversationStore::default();
        store.save("u", "old", &transcript()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.save("u", "new", &transcript()).await.unwrap();
        store.save("someone-else", "x", &transcript()).await.unwrap();

        let chat_ids: Vec<String> = store
            .list("u")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.chat_id)
            .collect();
        assert_eq!(chat_ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn delete_all_counts_only_the_users_conversations() {
        let store = MemoryConversationStore::default();
        store.save("u", "a", &transcript()).await.unwrap();
        store.save("u", "b", &transcript()).await.unwrap();
        store.save("v", "a", &transcript()).await.unwrap();

        assert_eq!(store.delete_all("u").await.unwrap(), 2);
        assert!(store.list("u").await.unwrap().is_empty());
        assert_eq!(store.list("v").await.unwrap().len(), 1);
        assert_eq!(store.delete_all("u").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn save_validates_inputs() {
        let store = MemoryConversationStore::default();
        assert!(matches!(
            store.save("", "c1", &transcript()).await,
            Err(StoreError::Validation(_))
        ));
        assert!(store.list("").await.unwrap().is_empty());
    }
}
