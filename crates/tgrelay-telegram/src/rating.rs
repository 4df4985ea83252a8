//! Content-safety rating lookups.
//!
//! Two providers are supported. A custom rating API (`GET <base>?url=…`
//! answering `{ "rating": n }`) wins over ModerateContent (`rating_index`).
//! Without either the rating is [`Rating::UNRATED`]; any failure yields
//! [`Rating::LOOKUP_FAILED`].

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tgrelay_common::config::RatingConfig;
use tgrelay_common::models::Rating;
use tracing::{debug, warn};

use crate::error::TelegramError;

const MODERATE_CONTENT_URL: &str = "https://api.moderatecontent.com/moderate/";

/// Scores a publicly resolvable file URL.
#[async_trait]
pub trait RatingService: Send + Sync {
    async fn rate(&self, file_url: &str) -> Rating;
}

#[derive(Debug, Clone)]
enum Provider {
    Disabled,
    ModerateContent { api_key: String },
    Custom { base_url: String },
}

pub struct RatingClient {
    http: Client,
    provider: Provider,
}

#[derive(Debug, Deserialize)]
struct ModerateContentResponse {
    rating_index: i64,
}

#[derive(Debug, Deserialize)]
struct CustomRatingResponse {
    rating: i64,
}

impl RatingClient {
    pub fn new(config: &RatingConfig) -> Result<Self, TelegramError> {
        let http = Client::builder()
            .user_agent(concat!("tgrelay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            provider: Self::provider_for(config),
        })
    }

    fn provider_for(config: &RatingConfig) -> Provider {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };
        if let Some(base_url) = non_empty(&config.api_base_url) {
            Provider::Custom { base_url }
        } else if let Some(api_key) = non_empty(&config.moderation_api_key) {
            Provider::ModerateContent { api_key }
        } else {
            Provider::Disabled
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.provider, Provider::Disabled)
    }

    async fn lookup(&self, file_url: &str) -> Result<Rating, TelegramError> {
        match &self.provider {
            Provider::Disabled => Ok(Rating::UNRATED),
            Provider::ModerateContent { api_key } => {
                let resp: ModerateContentResponse = self
                    .http
                    .get(MODERATE_CONTENT_URL)
                    .query(&[("key", api_key.as_str()), ("url", file_url)])
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                Ok(Rating(resp.rating_index))
            }
            Provider::Custom { base_url } => {
                let resp: CustomRatingResponse = self
                    .http
                    .get(base_url)
                    .query(&[("url", file_url)])
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                Ok(Rating(resp.rating))
            }
        }
    }
}

#[async_trait]
impl RatingService for RatingClient {
    async fn rate(&self, file_url: &str) -> Rating {
        match self.lookup(file_url).await {
            Ok(rating) => {
                debug!(rating = rating.0, "Rating lookup complete");
                rating
            }
            Err(e) => {
                warn!(error = %e, "Rating lookup failed");
                Rating::LOOKUP_FAILED
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: Option<&str>, base: Option<&str>) -> RatingConfig {
        RatingConfig {
            moderation_api_key: key.map(str::to_owned),
            api_base_url: base.map(str::to_owned),
        }
    }

    #[test]
    fn custom_base_url_wins_over_key() {
        let provider = RatingClient::provider_for(&config(Some("k"), Some("https://rate.example")));
        assert!(matches!(provider, Provider::Custom { .. }));
    }

    #[test]
    fn key_alone_selects_moderate_content() {
        let provider = RatingClient::provider_for(&config(Some("k"), Some("  ")));
        assert!(matches!(provider, Provider::ModerateContent { .. }));
    }

    #[tokio::test]
    async fn unconfigured_rating_is_neutral() {
        let client = RatingClient::new(&config(None, None)).unwrap();
        assert!(!client.is_enabled());
        assert_eq!(client.rate("https://example.com/f.jpg").await, Rating::UNRATED);
    }

    #[tokio::test]
    async fn unreachable_service_reports_lookup_failure() {
        // Port 9 (discard) on loopback refuses connections.
        let client = RatingClient::new(&config(None, Some("http://127.0.0.1:9/rate"))).unwrap();
        assert_eq!(
            client.rate("https://example.com/f.jpg").await,
            Rating::LOOKUP_FAILED
        );
    }
}
