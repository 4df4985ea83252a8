//! Middleware and extractors: request metadata and preflight status.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts, Request},
    http::{HeaderMap, Method, StatusCode, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::AppState;

/// Caller details every handler needs: where the relay is reachable from the
/// caller's side, who linked the request, and the client address.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// `scheme://host[:port]` the client used, or the configured public URL.
    pub origin: String,
    pub referer: Option<String>,
    pub ip: String,
}

impl FromRequestParts<Arc<AppState>> for RequestMeta {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let origin = match state.config.server.public_url.as_deref() {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => origin_from_headers(&parts.headers),
        };
        let referer = header_str(&parts.headers, "referer").map(str::to_string);
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        let ip = client_ip(&parts.headers).or(peer).unwrap_or_default();

        Ok(Self {
            origin,
            referer,
            ip,
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn origin_from_headers(headers: &HeaderMap) -> String {
    let scheme = header_str(headers, "x-forwarded-proto")
        .and_then(|v| v.split(',').next())
        .map_or("http", str::trim);
    let host = header_str(headers, "x-forwarded-host")
        .or_else(|| header_str(headers, "host"))
        .unwrap_or("localhost");
    format!("{scheme}://{host}")
}

/// Client address as reported by a fronting proxy.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header_str(headers, "x-real-ip"))
        .or_else(|| header_str(headers, "cf-connecting-ip"))
        .map(str::to_string)
}

// ── Preflight ─────────────────────────────────────────────────────────────────

/// Answer every successful `OPTIONS` with `204 No Content` and an empty body.
///
/// `CorsLayer` replies to preflights itself with `200`; this runs outside it.
pub async fn preflight_no_content(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_options && response.status().is_success() {
        *response.status_mut() = StatusCode::NO_CONTENT;
        *response.body_mut() = Body::empty();
    }
    response
}

/// Route-level `OPTIONS` handler for requests that are not CORS preflights.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
