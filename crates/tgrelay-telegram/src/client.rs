//! Bot API client used as the relay's file store.
//!
//! Uploads are posted into a fixed channel with the `send*` method matching
//! their MIME type; files are read back through `getFile` and the Bot API's
//! file download endpoint.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tgrelay_telegram::{FileBackend, TelegramClient};
//! # async fn run(config: &tgrelay_common::config::TelegramConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let client = TelegramClient::new(config)?;
//! let path = client.resolve_path("AgACAgUAAxkDAAIB").await?;
//! let file = client.download(&path).await?;
//! # let _ = file;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tgrelay_common::config::TelegramConfig;
use tgrelay_common::media::SendMethod;
use tracing::debug;

use crate::error::TelegramError;
use crate::types::{ApiResponse, Download, TelegramFile};

// ─── Seam ────────────────────────────────────────────────────────────────────

/// A file to post into the storage channel.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub method: SendMethod,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Messaging backend used as file storage.
///
/// Object safe so handlers can hold `Arc<dyn FileBackend>`.
#[async_trait]
pub trait FileBackend: Send + Sync {
    /// Post the upload. Returns the backend's raw JSON answer when it reports success.
    async fn send_media(&self, upload: MediaUpload) -> Result<Value, TelegramError>;

    /// Look up a file id.
    async fn get_file(&self, file_id: &str) -> Result<TelegramFile, TelegramError>;

    /// Fetch the bytes behind a resolved file path.
    async fn download(&self, file_path: &str) -> Result<Download, TelegramError>;

    /// Fully-qualified URL of a resolved file path.
    fn file_url(&self, file_path: &str) -> String;

    /// Resolve a file id to its temporary download path.
    async fn resolve_path(&self, file_id: &str) -> Result<String, TelegramError> {
        self.get_file(file_id)
            .await?
            .file_path
            .filter(|path| !path.is_empty())
            .ok_or_else(|| TelegramError::Shape("getFile".into(), "file_path missing".into()))
    }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async Bot API client. No timeouts or retries are applied to any call.
pub struct TelegramClient {
    http: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, TelegramError> {
        let http = Client::builder()
            .user_agent(concat!("tgrelay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }
}

#[async_trait]
impl FileBackend for TelegramClient {
    async fn send_media(&self, upload: MediaUpload) -> Result<Value, TelegramError> {
        let method = upload.method.api_method();
        let mime = if Part::text("").mime_str(&upload.content_type).is_ok() {
            upload.content_type.as_str()
        } else {
            debug!(content_type = %upload.content_type, "Unparseable content type, sending as octet-stream");
            "application/octet-stream"
        };
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(mime)?;
        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .part(upload.method.field_name(), part);

        debug!("Bot API {}", method);
        let resp = self
            .http
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        let raw: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        let ok = raw.get("ok").and_then(Value::as_bool).unwrap_or(false);
        if !status.is_success() || !ok {
            let description = raw
                .get("description")
                .and_then(Value::as_str)
                .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_owned);
            return Err(TelegramError::Rejected {
                method: method.to_owned(),
                description,
                raw,
            });
        }
        Ok(raw)
    }

    async fn get_file(&self, file_id: &str) -> Result<TelegramFile, TelegramError> {
        debug!(file_id, "Bot API getFile");
        let resp = self
            .http
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)])
            .send()
            .await?;

        let status = resp.status();
        let raw: Value = resp.json().await?;
        let parsed: ApiResponse<TelegramFile> = serde_json::from_value(raw.clone())?;
        if !status.is_success() || !parsed.ok {
            return Err(TelegramError::Rejected {
                method: "getFile".into(),
                description: parsed
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
                raw,
            });
        }
        parsed
            .result
            .ok_or_else(|| TelegramError::Shape("getFile".into(), "response has no result".into()))
    }

    async fn download(&self, file_path: &str) -> Result<Download, TelegramError> {
        let resp = self.http.get(self.file_url(file_path)).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TelegramError::Download {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = resp.bytes().await?.to_vec();
        Ok(Download {
            content_type,
            bytes,
        })
    }

    fn file_url(&self, file_path: &str) -> String {
        format!(
            "{}/file/bot{}/{}",
            self.api_base,
            self.bot_token,
            file_path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TelegramClient {
        TelegramClient::new(&TelegramConfig {
            bot_token: "123:abc".into(),
            chat_id: "-100".into(),
            api_base: "https://api.telegram.org/".into(),
        })
        .unwrap()
    }

    #[test]
    fn urls_follow_bot_api_layout() {
        let client = client();
        assert_eq!(
            client.method_url("getFile"),
            "https://api.telegram.org/bot123:abc/getFile"
        );
        assert_eq!(
            client.file_url("photos/file_1.jpg"),
            "https://api.telegram.org/file/bot123:abc/photos/file_1.jpg"
        );
    }
}
