//! Conversation request handlers.

use axum::extract::State;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::extract::{AppJson, AppQuery};
use crate::middleware::auth::Caller;
use crate::models::{
    ConversationsQuery, ConversationsResponse, NewChatRequest, NewChatResponse, SaveChatRequest,
    SaveChatResponse,
};
use crate::services::conversations;

/// `POST /save-chat`: save the client's transcript under `chat_id`.
pub async fn save_chat_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    AppJson(body): AppJson<SaveChatRequest>,
) -> AppResult<Json<SaveChatResponse>> {
    let resp = conversations::save(&state, &caller, body).await?;
    Ok(Json(resp))
}

/// `GET /get-conversations`: list saved conversations, newest first.
pub async fn get_conversations_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    AppQuery(query): AppQuery<ConversationsQuery>,
) -> AppResult<Json<ConversationsResponse>> {
    let resp = conversations::list(&state, &caller, query.user_id.as_deref()).await?;
    Ok(Json(resp))
}

/// `POST /new-chat`: delete all saved conversations. The body is optional
/// for token-authenticated callers.
pub async fn new_chat_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    body: Option<AppJson<NewChatRequest>>,
) -> AppResult<Json<NewChatResponse>> {
    let body = body.map(|AppJson(body)| body).unwrap_or_default();
    let resp = conversations::reset(&state, &caller, body.user_id.as_deref()).await?;
    Ok(Json(resp))
}
