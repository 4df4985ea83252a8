//! # tgrelay-api
//!
//! HTTP layer for tgrelay. Uploads are forwarded into a Telegram channel and
//! served back by file id; untrusted retrievals are logged and gated by a
//! cached safety rating.

pub mod deferred;
pub mod middleware;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tgrelay_common::config::AppConfig;
use tgrelay_common::referer::TrustedReferers;
use tgrelay_db::Database;
use tgrelay_telegram::{FileBackend, RatingService};

pub use deferred::DeferredTasks;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Telegram Bot API (or a stand-in) holding the files.
    pub backend: Arc<dyn FileBackend>,
    /// Moderation API used by upload bookkeeping.
    pub rating: Arc<dyn RatingService>,
    /// Optional store. Without it nothing is logged or rated and every
    /// retrieval takes the trusted path.
    pub db: Option<Database>,
    pub trusted_referers: Arc<TrustedReferers>,
    /// Post-response bookkeeping.
    pub tasks: DeferredTasks,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        backend: Arc<dyn FileBackend>,
        rating: Arc<dyn RatingService>,
        db: Option<Database>,
    ) -> Self {
        let trusted_referers = Arc::new(TrustedReferers::new(
            &config.retrieval.trusted_referer_paths,
        ));
        Self {
            config,
            backend,
            rating,
            db,
            trusted_referers,
            tasks: DeferredTasks::new(),
        }
    }
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::upload::router(state.config.limits.max_upload_bytes))
        .merge(routes::file::router())
        .merge(routes::health::router());

    Router::new()
        .nest("/api", api_routes)
        .layer(axum::middleware::from_fn(middleware::preflight_no_content))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
