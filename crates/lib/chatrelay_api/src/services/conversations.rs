//! Conversation service: explicit save, listing and reset.

use chatrelay_core::history::sanitize_history;
use chatrelay_core::store::validate_save;
use tracing::info;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::Caller;
use crate::models::{
    ConversationsResponse, NewChatResponse, SaveChatRequest, SaveChatResponse,
};

/// Save (upsert) a client-held transcript. The history is sanitized first.
pub async fn save(
    state: &AppState,
    caller: &Caller,
    req: SaveChatRequest,
) -> AppResult<SaveChatResponse> {
    let user_id = caller.resolve_user_id(req.user_id.as_deref())?;
    let chat_id = req.chat_id.unwrap_or_default();
    let messages = sanitize_history(&req.history);
    validate_save(&user_id, &chat_id, &messages)?;

    let saved = state
        .stores()?
        .conversations
        .save(&user_id, &chat_id, &messages)
        .await?;

    info!(%user_id, %chat_id, messages = messages.len(), "conversation saved");
    Ok(SaveChatResponse {
        message: "Conversation saved successfully".into(),
        id: saved.id,
    })
}

/// List the caller's conversations, newest first.
pub async fn list(
    state: &AppState,
    caller: &Caller,
    user_id: Option<&str>,
) -> AppResult<ConversationsResponse> {
    let user_id = caller.resolve_user_id(user_id)?;
    let conversations = state.stores()?.conversations.list(&user_id).await?;
    Ok(ConversationsResponse { conversations })
}

/// Delete all of the caller's conversations.
///
/// Without a store this still succeeds so the client can reset its own view.
pub async fn reset(
    state: &AppState,
    caller: &Caller,
    user_id: Option<&str>,
) -> AppResult<NewChatResponse> {
    let user_id = caller.resolve_user_id(user_id)?;

    let Some(stores) = &state.stores else {
        return Ok(NewChatResponse {
            message: "No database connection, frontend reset only".into(),
            deleted: 0,
        });
    };

    let deleted = stores.conversations.delete_all(&user_id).await?;
    info!(%user_id, deleted, "conversations deleted");
    Ok(NewChatResponse {
        message: "Conversations deleted successfully".into(),
        deleted,
    })
}
