//! File retrieval: resolves a Telegram file id and streams the bytes back.
//!
//! GET     /api/file/{id}   Serve the file (`POST` behaves the same)
//! OPTIONS /api/file/{id}   CORS preflight
//!
//! Requests embedded by the relay's own admin pages (or any request when no
//! store is configured) are served straight away. Everything else is logged
//! and checked against the cached rating; blocked files redirect to a
//! placeholder page.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tgrelay_common::error::{RelayError, RelayResult};
use tgrelay_common::models::{AccessLogEntry, retrieval_path};
use tgrelay_common::time::now_formatted;
use tgrelay_db::repository::{access_log, ratings};
use tgrelay_telegram::{Download, file_name_from_path};
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;
use crate::middleware::{RequestMeta, preflight};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/file/{id}",
            get(serve_file).post(serve_file).options(preflight),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE])
                .max_age(Duration::from_secs(86_400)),
        )
}

async fn serve_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    meta: RequestMeta,
) -> RelayResult<Response> {
    // `abc.jpg` and `abc` name the same file
    let file_id = id.split('.').next().unwrap_or_default();
    if file_id.is_empty() {
        return Err(RelayError::validation("File id is required"));
    }

    let file_path = state.backend.resolve_path(file_id).await.map_err(|e| {
        tracing::warn!(file_id, error = %e, "Could not resolve file");
        RelayError::from(e)
    })?;
    let download = state.backend.download(&file_path).await.map_err(|e| {
        tracing::warn!(file_id, error = %e, "Could not fetch file");
        RelayError::from(e)
    })?;
    let file_name = file_name_from_path(&file_path).to_string();

    let trusted = state
        .trusted_referers
        .is_trusted(meta.referer.as_deref(), &meta.origin);
    let db = match &state.db {
        Some(db) if !trusted => db.clone(),
        _ => {
            tracing::debug!(file_id, trusted, "Serving without access checks");
            return Ok(file_response(download, &file_name));
        }
    };

    let url = retrieval_path(file_id);
    let entry = AccessLogEntry {
        url: url.clone(),
        referer: meta.referer.unwrap_or_default(),
        ip: meta.ip,
        time: now_formatted(),
    };
    let pool = db.pool.clone();
    state.tasks.spawn("access_log", async move {
        access_log::insert(&pool, &entry).await?;
        Ok(())
    });

    match ratings::find(&db.pool, &url).await {
        Ok(Some(record)) => {
            let pool = db.pool.clone();
            let counted_url = url.clone();
            state.tasks.spawn("rating_total", async move {
                ratings::increment_total(&pool, &counted_url).await?;
                Ok(())
            });

            if record.rating().is_blocked() {
                tracing::info!(file_id, rating = record.rating, "Blocked file requested");
                let location = format!("{}{}", meta.origin, state.config.retrieval.blocked_redirect);
                return Ok(found(&location));
            }
        }
        Ok(None) => tracing::debug!(file_id, "No rating record, serving"),
        Err(e) => tracing::warn!(file_id, error = %e, "Rating lookup failed, serving"),
    }

    Ok(file_response(download, &file_name))
}

fn file_response(download: Download, file_name: &str) -> Response {
    let content_type = download
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    let safe_name: String = file_name
        .chars()
        .filter(|c| !matches!(c, '"' | '\\') && !c.is_control())
        .collect();
    let disposition = HeaderValue::from_str(&format!("inline; filename=\"{safe_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("inline"));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(download.bytes),
    )
        .into_response()
}

/// `302 Found` to `location`.
fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => RelayError::Internal(anyhow::anyhow!("invalid redirect location")).into_response(),
    }
}
