//! Health endpoint.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::AppState;
use crate::models::HealthResponse;

/// `GET /health`: reports the version and whether the store is reachable.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = match &state.stores {
        None => "disabled",
        Some(stores) => match stores.conversations.ping().await {
            Ok(()) => "connected",
            Err(e) => {
                warn!("store health check failed: {e}");
                "unreachable"
            }
        },
    };

    Json(HealthResponse {
        status: "ok".into(),
        version: chatrelay_core::version().into(),
        store: store.into(),
    })
}
