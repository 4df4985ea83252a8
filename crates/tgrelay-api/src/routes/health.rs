//! Health check endpoint for load balancers and container probes.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    /// `disabled` when no store is configured.
    store: String,
}

/// Health check router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (status, store) = match &state.db {
        Some(db) if db.health_check().await => ("healthy", "ok"),
        Some(_) => ("degraded", "unreachable"),
        None => ("healthy", "disabled"),
    };

    Json(HealthResponse {
        status: status.into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store.into(),
    })
}
