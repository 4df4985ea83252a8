//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > tgrelay.toml > defaults
//!
//! The loaded [`AppConfig`] is a plain value; callers hand it to the router
//! and clients at construction time.

use serde::Deserialize;
use std::fmt;

/// Environment variable prefix, e.g. `TGRELAY__TELEGRAM__BOT_TOKEN`.
pub const ENV_PREFIX: &str = "TGRELAY";

/// Load configuration from `.env`, `tgrelay.toml` and the process environment.
pub fn load() -> Result<AppConfig, config::ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    load_from(environment())
}

/// The environment source used by [`load`].
pub fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("retrieval.trusted_referer_paths")
        .try_parsing(true)
}

/// Build the configuration with defaults, the optional config file, and the
/// given environment source layered on top.
pub fn load_from(env: config::Environment) -> Result<AppConfig, config::ConfigError> {
    let cfg = config::Config::builder()
        // Defaults
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("telegram.api_base", "https://api.telegram.org")?
        .set_default("database.max_connections", 5)?
        .set_default(
            "retrieval.trusted_referer_paths",
            vec!["/admin", "/list", "/block-img.html"],
        )?
        .set_default("retrieval.blocked_redirect", "/block-img.html")?
        .set_default("limits.max_upload_bytes", 52_428_800)? // 50MB, the Bot API ceiling
        // Optional config file
        .add_source(config::File::with_name("tgrelay").required(false))
        .add_source(env)
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub rating: RatingConfig,
    pub retrieval: RetrievalConfig,
    pub limits: LimitsConfig,
}

impl AppConfig {
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "telegram.bot_token must not be empty".into(),
            ));
        }
        if self.telegram.chat_id.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "telegram.chat_id must not be empty".into(),
            ));
        }
        if let Some(url) = self.server.public_url.as_deref() {
            if !is_http_url(url) {
                return Err(config::ConfigError::Message(
                    "server.public_url must start with http:// or https://".into(),
                ));
            }
        }
        if !self.retrieval.blocked_redirect.starts_with('/') {
            return Err(config::ConfigError::Message(
                "retrieval.blocked_redirect must be an absolute path".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public origin used when building retrieval URLs (e.g. "https://img.example.com").
    /// When unset the origin is derived from the request's Host headers.
    pub public_url: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct TelegramConfig {
    /// Bot API token. Grants full control of the bot, never log it.
    pub bot_token: String,
    /// Destination channel or chat id that receives every upload.
    pub chat_id: String,
    /// Bot API base URL; point at a self-hosted Bot API server if needed.
    pub api_base: String,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL. Omit to disable access logging and rating.
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

#[derive(Deserialize, Clone, Default)]
pub struct RatingConfig {
    /// ModerateContent API key.
    pub moderation_api_key: Option<String>,
    /// Custom rating API base URL; takes precedence over the ModerateContent key.
    pub api_base_url: Option<String>,
}

impl fmt::Debug for RatingConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RatingConfig")
            .field(
                "moderation_api_key",
                &self.moderation_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Same-origin paths whose pages may embed files without being logged or rated.
    pub trusted_referer_paths: Vec<String>,
    /// Path served (as a redirect) instead of a blocked file.
    pub blocked_redirect: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    pub max_upload_bytes: usize,
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = load_from(env_from(&[
            ("TGRELAY__TELEGRAM__BOT_TOKEN", "123:abc"),
            ("TGRELAY__TELEGRAM__CHAT_ID", "-1001234"),
        ]))
        .unwrap();

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.telegram.api_base, "https://api.telegram.org");
        assert!(cfg.database.url.is_none());
        assert!(cfg.rating.moderation_api_key.is_none());
        assert_eq!(
            cfg.retrieval.trusted_referer_paths,
            vec!["/admin", "/list", "/block-img.html"]
        );
        assert_eq!(cfg.retrieval.blocked_redirect, "/block-img.html");
        assert_eq!(cfg.limits.max_upload_bytes, 52_428_800);
    }

    #[test]
    fn trusted_paths_parse_as_list() {
        let cfg = load_from(env_from(&[
            ("TGRELAY__TELEGRAM__BOT_TOKEN", "123:abc"),
            ("TGRELAY__TELEGRAM__CHAT_ID", "-1001234"),
            ("TGRELAY__RETRIEVAL__TRUSTED_REFERER_PATHS", "/admin,/gallery"),
        ]))
        .unwrap();

        assert_eq!(cfg.retrieval.trusted_referer_paths, vec!["/admin", "/gallery"]);
    }

    #[test]
    fn empty_bot_token_is_rejected() {
        let err = load_from(env_from(&[
            ("TGRELAY__TELEGRAM__BOT_TOKEN", "  "),
            ("TGRELAY__TELEGRAM__CHAT_ID", "-1001234"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("bot_token"));
    }

    #[test]
    fn missing_chat_id_is_rejected() {
        assert!(load_from(env_from(&[("TGRELAY__TELEGRAM__BOT_TOKEN", "123:abc")])).is_err());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let cfg = load_from(env_from(&[
            ("TGRELAY__TELEGRAM__BOT_TOKEN", "sensitive-bot-token"),
            ("TGRELAY__TELEGRAM__CHAT_ID", "-1001234"),
            ("TGRELAY__RATING__MODERATION_API_KEY", "sensitive-api-key"),
        ]))
        .unwrap();

        let debug_output = format!("{cfg:?}");
        assert!(!debug_output.contains("sensitive-bot-token"));
        assert!(!debug_output.contains("sensitive-api-key"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
