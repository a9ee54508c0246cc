//! Client history normalization.
//!
//! Chat history arrives from the browser as arbitrary JSON. Before it is
//! forwarded to the model provider it is reduced to well-formed [`Message`]s
//! and, when needed, closed off with the current user turn.

use serde_json::Value;

use crate::models::chat::{Message, Role};

/// Normalize a client-supplied history and append the current user message.
///
/// - entries that are not objects with string `role` and `content` are dropped
/// - roles are lower-cased; only `system`, `user` and `assistant` survive
/// - blank content (after trimming) is dropped; kept content is not trimmed
/// - `current` is appended as a user turn unless the last kept entry already
///   is that exact user turn, or `current` is empty
///
/// A `history` that is not a JSON array yields an empty list before the
/// append step. This never fails.
pub fn normalize_history(history: &Value, current: &str) -> Vec<Message> {
    let mut messages = sanitize_history(history);

    if current.is_empty() {
        return messages;
    }

    let already_last = messages
        .last()
        .is_some_and(|last| last.role == Role::User && last.content == current);
    if !already_last {
        messages.push(Message::user(current));
    }

    messages
}

/// Filter a client-supplied history down to well-formed messages, without
/// appending anything.
pub fn sanitize_history(history: &Value) -> Vec<Message> {
    let Some(entries) = history.as_array() else {
        return Vec::new();
    };
    entries.iter().filter_map(parse_entry).collect()
}

fn parse_entry(entry: &Value) -> Option<Message> {
    let object = entry.as_object()?;
    let role = object.get("role")?.as_str()?.parse::<Role>().ok()?;
    let content = object.get("content")?.as_str()?;
    if content.trim().is_empty() {
        return None;
    }
    Some(Message::new(role, content))
}
