use super::NewsSource;
use crate::config::NewsSettings;
use crate::error::FetchError;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

// Type alias for the rate limiter to simplify signatures
type NewsRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Google News RSS search client
///
/// Clones share one rate limiter.
#[derive(Clone)]
pub struct GoogleNewsClient {
    client: Client,
    base_url: String,
    rate_limiter: Arc<NewsRateLimiter>,
}

// ============== Feed Types ==============

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
}

impl GoogleNewsClient {
    pub fn new(
        base_url: impl Into<String>,
        requests_per_minute: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;

        let rpm = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(rpm)));

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    pub fn from_settings(settings: &NewsSettings, timeout: Duration) -> Result<Self, FetchError> {
        Self::new(&settings.base_url, settings.requests_per_minute, timeout)
    }

    fn parse_headlines(body: &str, limit: usize) -> Result<Vec<String>, FetchError> {
        let feed: Rss = quick_xml::de::from_str(body)?;

        Ok(feed
            .channel
            .items
            .into_iter()
            .map(|item| item.title.trim().to_string())
            .filter(|title| !title.is_empty())
            .take(limit)
            .collect())
    }
}

#[async_trait]
impl NewsSource for GoogleNewsClient {
    /// Endpoint: GET /rss/search?q={company}&hl=en-US&gl=US&ceid=US:en
    async fn fetch_headlines(&self, company: &str, limit: usize) -> Result<Vec<String>, FetchError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/rss/search", self.base_url);
        tracing::debug!("Fetching headlines for {} from {}", company, url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", company),
                ("hl", "en-US"),
                ("gl", "US"),
                ("ceid", "US:en"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                query: company.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Self::parse_headlines(&body, limit)
    }
}
