//! Errors raised while talking to the Bot API or the moderation API.

use thiserror::Error;
use tgrelay_common::error::RelayError;

#[derive(Debug, Error)]
pub enum TelegramError {
    // ── Transport ───────────────────────────────────────────────────────────

    #[error("HTTP error talking to {0}: {1}")]
    Http(String, String),

    // ── Remote answers ───────────────────────────────────────────────────────

    /// The Bot API answered but refused the call (`ok: false` or non-2xx).
    #[error("Bot API {method} failed: {description}")]
    Rejected {
        method: String,
        description: String,
        raw: serde_json::Value,
    },

    /// A file download answered with a non-success status.
    #[error("File download failed with HTTP {status}")]
    Download { status: u16, body: String },

    /// The answer parsed but lacks a field we depend on.
    #[error("Unexpected response from {0}: {1}")]
    Shape(String, String),

    // ── General ─────────────────────────────────────────────────────────────

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        // Bot API URLs embed the token; report only the host.
        let host = e
            .url()
            .map(|u| u.host_str().unwrap_or("?").to_owned())
            .unwrap_or_default();
        TelegramError::Http(host, e.without_url().to_string())
    }
}

impl From<TelegramError> for RelayError {
    fn from(e: TelegramError) -> Self {
        match e {
            TelegramError::Http(..) => RelayError::bad_gateway(e.to_string()),
            TelegramError::Rejected { ref raw, .. } => RelayError::BadGateway {
                details: Some(raw.clone()),
                message: e.to_string(),
            },
            TelegramError::Download { status, body } => RelayError::Upstream {
                status,
                message: body,
            },
            TelegramError::Shape(..) | TelegramError::Serialisation(_) => {
                RelayError::shape(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_calls_keep_the_raw_response() {
        let raw = serde_json::json!({ "ok": false, "description": "Bad Request: chat not found" });
        let err: RelayError = TelegramError::Rejected {
            method: "sendPhoto".into(),
            description: "Bad Request: chat not found".into(),
            raw: raw.clone(),
        }
        .into();
        match err {
            RelayError::BadGateway { details, .. } => assert_eq!(details, Some(raw)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn download_failures_relay_status_and_body() {
        let err: RelayError = TelegramError::Download {
            status: 404,
            body: "Not Found".into(),
        }
        .into();
        assert_eq!(err.status_code().as_u16(), 404);
        assert_eq!(err.to_string(), "Not Found");
    }
}
