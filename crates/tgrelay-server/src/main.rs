//! # tgrelay server
//!
//! Main binary: loads configuration, connects the optional store, builds the
//! Bot API and moderation clients, and serves the HTTP API. On shutdown it
//! stops accepting requests, then waits for outstanding bookkeeping tasks.

use std::net::SocketAddr;
use std::sync::Arc;

use tgrelay_api::{AppState, build_router};
use tgrelay_db::Database;
use tgrelay_telegram::{RatingClient, TelegramClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Arc::new(tgrelay_common::config::load()?);

    // Initialize tracing (structured logging)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tgrelay=debug,tower_http=info".into()),
        )
        .with_target(true)
        .init();

    tracing::info!("Starting tgrelay v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(?config, "Loaded configuration");

    // === Store (optional) ===
    let db = match config.database.url.as_deref() {
        Some(url) => {
            let db = Database::connect(url, config.database.max_connections).await?;
            db.migrate().await?;
            Some(db)
        }
        None => {
            tracing::warn!("No database configured, access logging and rating are disabled");
            None
        }
    };

    // === Outbound clients ===
    let backend = Arc::new(TelegramClient::new(&config.telegram)?);
    let rating = RatingClient::new(&config.rating)?;
    if !rating.is_enabled() {
        tracing::info!("No rating service configured, uploads are recorded as unrated");
    }

    // === REST API Server ===
    let state = AppState::new(config.clone(), backend, Arc::new(rating), db);
    let tasks = state.tasks.clone();
    let router = build_router(state);
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    tracing::info!("REST API listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!(pending = tasks.pending(), "Draining deferred tasks...");
    tasks.drain().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
