//! Chat service: runs the orchestrator and stores the exchange.

use chatrelay_core::uuid::uuidv7;
use tracing::{info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthPolicy, Caller};
use crate::models::{ChatRequest, ChatResponse};

/// User id recorded for exchanges from callers that identify neither by
/// token nor by `user_id`.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Answer one chat message.
///
/// On success the exchange is saved under `(user, chat_id)` when a store is
/// configured, persistence is enabled and the exchange has an owner. A failed
/// save is logged and does not fail the request.
pub async fn chat(state: &AppState, caller: &Caller, req: ChatRequest) -> AppResult<ChatResponse> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message is required".into()));
    }

    let turn = state
        .chat
        .reply(&req.message, &req.history)
        .await
        .map_err(|e| AppError::upstream(state.config.error_disclosure, e))?;

    let chat_id = non_blank(req.chat_id).unwrap_or_else(|| uuidv7().to_string());

    if state.config.persist_chats
        && let Some(stores) = &state.stores
        && let Some(user_id) = owner(state, caller, req.user_id)
    {
        match stores
            .conversations
            .save(&user_id, &chat_id, &turn.transcript)
            .await
        {
            Ok(saved) => info!(%user_id, %chat_id, id = %saved.id, "chat exchange saved"),
            Err(e) => warn!(%user_id, %chat_id, "failed to save chat exchange: {e}"),
        }
    }

    Ok(ChatResponse {
        reply: turn.reply,
        chat_id,
    })
}

/// The user an exchange is saved for: the token subject, else the supplied
/// `user_id` (or [`ANONYMOUS_USER`]) when the conversation routes accept
/// anonymous callers. `None` means the exchange is not saved.
fn owner(state: &AppState, caller: &Caller, supplied: Option<String>) -> Option<String> {
    if let Some(sub) = caller.subject() {
        return Some(sub.to_string());
    }
    match state.config.conversations_auth {
        AuthPolicy::Required => None,
        AuthPolicy::Optional => {
            Some(non_blank(supplied).unwrap_or_else(|| ANONYMOUS_USER.to_string()))
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
