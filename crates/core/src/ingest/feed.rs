use crate::config::Settings;
use crate::error::StonksError;
use crate::ingest::types::FeedPage;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

const CURSOR_PARAM: &str = "next_page";

#[async_trait::async_trait]
pub trait RatingFeed: Send + Sync {
    /// Configured endpoint; empty when the feed has not been set up.
    fn endpoint(&self) -> &str;

    /// Fetches one page. `None` (or an empty cursor) requests the first page.
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<FeedPage, StonksError>;
}

#[derive(Debug, Clone)]
pub struct HttpRatingFeed {
    http: reqwest::Client,
    url: String,
    headers: HeaderMap,
}

impl HttpRatingFeed {
    pub fn from_settings(settings: &Settings) -> Result<Self, StonksError> {
        let auth = match (&settings.feed_auth_header, &settings.feed_auth_token) {
            (Some(name), Some(value)) => Some((name.as_str(), value.as_str())),
            _ => None,
        };

        Self::new(
            settings.feed_url.as_deref().unwrap_or_default(),
            auth,
            Duration::from_secs(settings.feed_timeout_secs),
        )
    }

    pub fn new(
        url: &str,
        auth: Option<(&str, &str)>,
        timeout: Duration,
    ) -> Result<Self, StonksError> {
        let mut headers = HeaderMap::new();
        if let Some((name, value)) = auth {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                StonksError::Configuration(format!("invalid FEED_AUTH_HEADER {name:?}: {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                StonksError::Configuration(format!("invalid FEED_AUTH_TOKEN: {e}"))
            })?;
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                StonksError::Configuration(format!("failed to build rating feed http client: {e}"))
            })?;

        Ok(Self {
            http,
            url: url.trim().to_string(),
            headers,
        })
    }
}

#[async_trait::async_trait]
impl RatingFeed for HttpRatingFeed {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<FeedPage, StonksError> {
        let mut req = self.http.get(&self.url).headers(self.headers.clone());
        if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
            req = req.query(&[(CURSOR_PARAM, cursor)]);
        }

        let res = req.send().await.map_err(StonksError::FeedUnavailable)?;

        let status = res.status();
        let text = res.text().await.map_err(StonksError::FeedUnavailable)?;

        if !status.is_success() {
            return Err(StonksError::FeedProtocol(format!(
                "rating feed HTTP {status}: {text}"
            )));
        }

        let page = serde_json::from_str::<FeedPage>(&text).map_err(|e| {
            StonksError::FeedProtocol(format!("failed to decode rating feed page: {e}"))
        })?;

        tracing::debug!(
            items = page.items.len(),
            has_next = page.next_cursor().is_some(),
            "fetched rating feed page"
        );
        Ok(page)
    }
}
