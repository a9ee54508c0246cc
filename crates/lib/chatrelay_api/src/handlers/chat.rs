//! Chat request handler.

use axum::extract::State;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::Caller;
use crate::models::{ChatRequest, ChatResponse};
use crate::services::chat;

/// `POST /chat`: relay a message to the model and return its reply.
pub async fn chat_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    AppJson(body): AppJson<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let resp = chat::chat(&state, &caller, body).await?;
    Ok(Json(resp))
}
