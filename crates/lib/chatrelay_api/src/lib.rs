//! # chatrelay_api
//!
//! HTTP API library for Chat Relay.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::Router;
use axum::routing::{get, post};
use chatrelay_core::chat::ChatOrchestrator;
use chatrelay_core::store::Stores;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};
use crate::handlers::{auth, chat, conversations, health, pages};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// Credential and conversation stores; `None` when no database is
    /// available, in which case store-backed routes answer 503.
    pub stores: Option<Stores>,
    /// Chat orchestrator (system prompt + model provider).
    pub chat: ChatOrchestrator,
}

impl AppState {
    /// The configured stores, or [`AppError::DbUnavailable`].
    pub fn stores(&self) -> AppResult<&Stores> {
        self.stores
            .as_ref()
            .ok_or_else(|| AppError::DbUnavailable("Database is not connected".into()))
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Pages and public endpoints (no auth)
    let public = Router::new()
        .route("/", get(pages::index))
        .route("/login-page", get(pages::login_page))
        .route("/register-page", get(pages::register_page))
        .route("/static/js/script.js", get(pages::chat_script))
        .route("/static/js/auth.js", get(pages::auth_script))
        .route("/health", get(health::health_handler))
        .route("/register", post(auth::register_handler))
        .route("/login", post(auth::login_handler));

    let chat_routes = Router::new()
        .route("/chat", post(chat::chat_handler))
        .layer(axum::middleware::from_fn_with_state(
            (state.clone(), state.config.chat_auth),
            middleware::auth::authenticate,
        ));

    let conversation_routes = Router::new()
        .route("/save-chat", post(conversations::save_chat_handler))
        .route(
            "/get-conversations",
            get(conversations::get_conversations_handler),
        )
        .route("/new-chat", post(conversations::new_chat_handler))
        .layer(axum::middleware::from_fn_with_state(
            (state.clone(), state.config.conversations_auth),
            middleware::auth::authenticate,
        ));

    Router::new()
        .merge(public)
        .merge(chat_routes)
        .merge(conversation_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
