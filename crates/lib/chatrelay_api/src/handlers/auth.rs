//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::models::{CredentialsRequest, MessageResponse, TokenResponse};
use crate::services::auth;

/// `POST /register`: create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let stores = state.stores()?;
    auth::register(stores.credentials.as_ref(), &body.email, &body.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".into(),
        }),
    ))
}

/// `POST /login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<CredentialsRequest>,
) -> AppResult<Json<TokenResponse>> {
    let stores = state.stores()?;
    let resp = auth::login(
        stores.credentials.as_ref(),
        &body.email,
        &body.password,
        state.config.jwt_secret.as_bytes(),
        state.config.token_ttl,
    )
    .await?;
    Ok(Json(resp))
}
