//! JSON news feed client.
//!
//! The feed is any endpoint returning news articles as JSON, either a bare
//! array or an object with an `items`/`articles` array. Each article needs
//! `title`, `source`, `date` (RFC 3339) and `url`; `impact` is optional and
//! is recomputed by the scorer anyway.

use crate::error::{AppError, Result};
use crate::types::NewsItem;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedResponse {
    List(Vec<NewsItem>),
    Wrapped {
        #[serde(alias = "articles")]
        items: Vec<NewsItem>,
    },
}

impl FeedResponse {
    fn into_items(self) -> Vec<NewsItem> {
        match self {
            FeedResponse::List(items) | FeedResponse::Wrapped { items } => items,
        }
    }
}

/// News feed client.
pub struct NewsFeedClient {
    client: Client,
    url: String,
}

impl NewsFeedClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Fetch the current articles.
    pub async fn fetch(&self) -> Result<Vec<NewsItem>> {
        debug!("Fetching news feed: {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::UpstreamFetch(format!("news request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamFetch(format!(
                "news feed HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::UpstreamFetch(format!("news body: {}", e)))?;
        let items = parse_feed(&body)?;

        debug!("Fetched {} news items", items.len());
        Ok(items)
    }
}

fn parse_feed(body: &str) -> Result<Vec<NewsItem>> {
    serde_json::from_str::<FeedResponse>(body)
        .map(FeedResponse::into_items)
        .map_err(|e| AppError::UpstreamFetch(format!("news feed parse error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let items = parse_feed(
            r#"[{"title":"Gold climbs","source":"Wire","date":"2024-05-01T10:00:00Z","url":"https://a"}]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].impact, 0.0);
        assert_eq!(items[0].id(), "Gold climbs|Wire");
    }

    #[test]
    fn test_parse_wrapped_articles() {
        let items = parse_feed(
            r#"{"articles":[{"title":"Gold slips","source":"Desk","date":"2024-05-01T10:00:00Z","url":"https://b","impact":0.6}]}"#,
        )
        .unwrap();
        assert_eq!(items[0].impact, 0.6);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(parse_feed("<html>"), Err(AppError::UpstreamFetch(_))));
    }
}
