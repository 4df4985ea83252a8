//! Centralized error type for the relay's HTTP surface.
//!
//! Uses `thiserror` for ergonomic error definitions and maps every variant to
//! a status code so handlers can return `RelayResult<T>` directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Application error type returned by every route handler.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    // === Client input errors ===
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Payload too large: {message}")]
    PayloadTooLarge { message: String },

    // === Upstream errors ===
    /// The messaging backend or moderation service failed or reported `ok: false`.
    #[error("{message}")]
    BadGateway {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// An upstream fetch answered with a non-success status; relayed verbatim.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    // === Internal errors ===
    /// The upstream answered successfully but in a shape we cannot read.
    #[error("Unexpected upstream response: {message}")]
    Shape { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body sent to clients.
#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    error: String,
    message: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl RelayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::BadGateway {
            message: message.into(),
            details: None,
        }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    /// Map error to HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Shape { .. } | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Error code string for programmatic handling by clients.
    pub fn error_code(&self) -> &str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::BadGateway { .. } => "BAD_GATEWAY",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::Shape { .. } => "UNEXPECTED_RESPONSE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't leak store details to clients
        let message = match &self {
            RelayError::Database(e) => {
                tracing::error!("Database error: {e}");
                "An internal error occurred".to_string()
            }
            RelayError::Internal(e) => {
                tracing::error!("Internal error: {e:#}");
                e.to_string()
            }
            other => other.to_string(),
        };

        let error = self.error_code().to_string();
        let details = match self {
            RelayError::BadGateway { details, .. } => details,
            _ => None,
        };

        let body = ErrorResponse {
            code: status.as_u16(),
            error,
            message,
            success: false,
            details,
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Convenience type alias for Results using RelayError.
pub type RelayResult<T> = Result<T, RelayError>;
