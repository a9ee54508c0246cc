//! # chatrelay_core
//!
//! Core domain logic for Chat Relay: message history normalization, system
//! prompt loading, bearer tokens, password hashing, conversation and
//! credential stores, and the chat model provider.

pub mod auth;
pub mod chat;
pub mod history;
pub mod llm;
pub mod migrate;
pub mod models;
pub mod prompt;
pub mod store;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
