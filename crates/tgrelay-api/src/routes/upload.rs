//! File upload route: multipart in, Telegram channel message out.
//!
//! POST    /api/upload   Upload a file (multipart/form-data, field `file`)
//! OPTIONS /api/upload   CORS preflight

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{Method, StatusCode, header},
    routing::post,
};
use tgrelay_common::error::{RelayError, RelayResult};
use tgrelay_common::media::SendMethod;
use tgrelay_common::models::{RatingRecord, UploadResponse, retrieval_path, retrieval_url};
use tgrelay_common::time::now_formatted;
use tgrelay_db::{Database, repository::ratings};
use tgrelay_telegram::{FileBackend, MediaUpload, RatingService, extract_uploaded_file};
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;
use crate::middleware::{RequestMeta, preflight};

pub fn router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(upload_file).options(preflight))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE])
                .max_age(Duration::from_secs(86_400)),
        )
}

/// The `file` part of the form.
struct IncomingFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

// ============================================================
// POST /upload
// ============================================================

/// Store one file in the channel and answer with its retrieval URL.
///
/// Rating bookkeeping runs after the response and never affects it.
async fn upload_file(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    multipart: Result<Multipart, MultipartRejection>,
) -> RelayResult<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| {
        RelayError::validation(format!("Expected a multipart/form-data body: {e}"))
    })?;
    let file = read_file_field(&mut multipart).await?;

    let method = SendMethod::for_mime(&file.content_type);
    let size = file.bytes.len();
    let raw = state
        .backend
        .send_media(MediaUpload {
            method,
            file_name: file.file_name,
            content_type: file.content_type,
            bytes: file.bytes,
        })
        .await
        .map_err(|e| {
            tracing::warn!(method = method.api_method(), error = %e, "Upload to Bot API failed");
            RelayError::from(e)
        })?;

    let uploaded = extract_uploaded_file(&raw).map_err(|e| {
        tracing::error!(error = %e, "Could not read file identity from Bot API response");
        RelayError::from(e)
    })?;
    tracing::info!(
        file_id = %uploaded.file_id,
        method = method.api_method(),
        size,
        "Stored upload"
    );

    if let Some(db) = state.db.clone() {
        state.tasks.spawn(
            "upload_rating",
            record_rating(
                state.backend.clone(),
                state.rating.clone(),
                db,
                uploaded.file_id.clone(),
                meta.referer.unwrap_or_default(),
                meta.ip,
            ),
        );
    }

    Ok(Json(UploadResponse {
        url: retrieval_url(&meta.origin, &uploaded.file_id),
        code: StatusCode::OK.as_u16(),
        name: uploaded.file_name,
    }))
}

async fn read_file_field(multipart: &mut Multipart) -> RelayResult<IncomingFile> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue; // Ignore unknown fields
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| RelayError::validation("Field `file` must be a file"))?;
        let content_type = field
            .content_type()
            .map_or_else(|| "application/octet-stream".to_string(), str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        // Browsers send an unnamed empty part when no file was chosen
        if file_name.is_empty() && bytes.is_empty() {
            break;
        }

        return Ok(IncomingFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(RelayError::validation("No file uploaded"))
}

fn multipart_error(e: MultipartError) -> RelayError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::PayloadTooLarge {
            message: e.body_text(),
        }
    } else {
        RelayError::validation(format!("Multipart error: {}", e.body_text()))
    }
}

/// Rate the stored file and create its `imginfo` row.
async fn record_rating(
    backend: Arc<dyn FileBackend>,
    rating: Arc<dyn RatingService>,
    db: Database,
    file_id: String,
    referer: String,
    ip: String,
) -> anyhow::Result<()> {
    let file_path = backend.resolve_path(&file_id).await?;
    let score = rating.rate(&backend.file_url(&file_path)).await;

    let record = RatingRecord {
        url: retrieval_path(&file_id),
        referer,
        ip,
        rating: score.0,
        total: 1,
        time: now_formatted(),
    };
    let created = ratings::insert(&db.pool, &record).await?;
    tracing::debug!(url = %record.url, rating = score.0, created, "Recorded upload rating");
    Ok(())
}
