//! Chat Relay HTTP server binary.
//!
//! Reads configuration from flags, the environment and an optional `.env`
//! file, connects the store and serves the API until Ctrl-C or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chatrelay_api::config::{ApiConfig, ErrorDisclosure};
use chatrelay_api::middleware::auth::AuthPolicy;
use chatrelay_core::auth::jwt::{DEFAULT_TOKEN_TTL_HOURS, MAX_TOKEN_TTL_HOURS, resolve_jwt_secret};
use chatrelay_core::chat::ChatOrchestrator;
use chatrelay_core::llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiConfig, OpenAiProvider};
use chatrelay_core::prompt::PromptSource;
use chatrelay_core::store::{Stores, postgres};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    Postgres,
    Memory,
}

/// CLI arguments for the chat server.
#[derive(Parser, Debug)]
#[command(name = "chatrelay_server", version, about = "Chat Relay HTTP server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:5000")]
    bind: String,

    /// Storage backend.
    #[arg(long, env = "STORE", value_enum, default_value_t = StoreKind::Postgres)]
    store: StoreKind,

    /// PostgreSQL connection URL. Without it the server runs with no store.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    /// Seconds to wait for the database at startup.
    #[arg(long, env = "DB_CONNECT_TIMEOUT_SECS", default_value_t = 5)]
    db_connect_timeout_secs: u64,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    openai_model: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    openai_base_url: String,

    /// Token signing secret. Falls back to `JWT_SECRET`, `SECRET_KEY`, then a
    /// secret persisted in the user data directory.
    #[arg(long, hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Token lifetime in hours.
    #[arg(
        long,
        env = "JWT_EXPIRES_HOURS",
        default_value_t = DEFAULT_TOKEN_TTL_HOURS,
        value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_TTL_HOURS)
    )]
    jwt_expires_hours: i64,

    /// System prompt file, resolved against `--prompt-base-dir` when relative.
    #[arg(long, env = "SYSTEM_PROMPT_FILE")]
    system_prompt_file: Option<PathBuf>,

    /// Inline system prompt, used when no prompt file is readable.
    #[arg(long, env = "SYSTEM_PROMPT")]
    system_prompt: Option<String>,

    #[arg(long, env = "PROMPT_BASE_DIR", default_value = ".")]
    prompt_base_dir: PathBuf,

    /// `generic` or `verbose` provider error messages.
    #[arg(long, env = "ERROR_DISCLOSURE", default_value_t = ErrorDisclosure::Generic)]
    error_disclosure: ErrorDisclosure,

    /// Token policy for `/chat`.
    #[arg(long, env = "CHAT_AUTH", default_value_t = AuthPolicy::Optional)]
    chat_auth: AuthPolicy,

    /// Token policy for the conversation routes.
    #[arg(long, env = "CONVERSATIONS_AUTH", default_value_t = AuthPolicy::Required)]
    conversations_auth: AuthPolicy,

    /// Persist each `/chat` exchange under its chat id.
    #[arg(long, env = "PERSIST_CHATS", default_value_t = true, action = clap::ArgAction::Set)]
    persist_chats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,chatrelay_api=debug,chatrelay_core=debug")
            }),
        )
        .init();

    let args = Args::parse();
    info!(bind = %args.bind, store = ?args.store, "starting chatrelay_server");

    let stores = open_stores(&args).await;

    let provider = OpenAiProvider::new(OpenAiConfig::new(
        args.openai_api_key.clone(),
        &args.openai_model,
        &args.openai_base_url,
    )?);
    if args.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; chat requests will fail");
    }
    info!(model = provider.model(), "model provider configured");

    let prompt = PromptSource::new(
        args.system_prompt_file.clone(),
        args.system_prompt.clone(),
        args.prompt_base_dir.clone(),
    );

    let mut config = ApiConfig::new(resolve_jwt_secret(args.jwt_secret.as_deref()));
    config.token_ttl = chrono::Duration::hours(args.jwt_expires_hours);
    config.error_disclosure = args.error_disclosure;
    config.chat_auth = args.chat_auth;
    config.conversations_auth = args.conversations_auth;
    config.persist_chats = args.persist_chats;

    let state = chatrelay_api::AppState {
        config,
        stores,
        chat: ChatOrchestrator::new(Arc::new(provider), prompt),
    };
    let app = chatrelay_api::router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Build the configured stores. A database that cannot be reached leaves the
/// server running without one.
async fn open_stores(args: &Args) -> Option<Stores> {
    match args.store {
        StoreKind::Memory => {
            info!("using in-memory store");
            Some(Stores::memory())
        }
        StoreKind::Postgres => {
            let Some(url) = args.database_url.as_deref() else {
                warn!("DATABASE_URL is not set; running without a database");
                return None;
            };
            let timeout = Duration::from_secs(args.db_connect_timeout_secs);
            let pool = match postgres::connect(url, args.max_connections, timeout).await {
                Ok(pool) => pool,
                Err(e) => {
                    warn!(error = %e, "database unreachable; running without a database");
                    return None;
                }
            };
            info!("running database migrations");
            if let Err(e) = chatrelay_core::migrate::migrate(&pool).await {
                warn!(error = %e, "migrations failed; running without a database");
                return None;
            }
            info!(max_connections = args.max_connections, "connected to PostgreSQL");
            Some(Stores::postgres(pool))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
