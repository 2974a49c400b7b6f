use std::time::Duration;

use herald_core::error::AppError;
use herald_core::models::SourceItem;
use reqwest::Client;

use super::listing_item;
use crate::http::{API_USER_AGENT, DEFAULT_TIMEOUT, build_client, send_error};

pub const DEFAULT_FEED_LIMIT: usize = 10;

/// RSS/Atom reader built on `feed-rs`.
#[derive(Clone)]
pub struct FeedAdapter {
    client: Client,
    limit: usize,
    timeout_secs: u64,
}

impl FeedAdapter {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(API_USER_AGENT, timeout)?,
            limit: DEFAULT_FEED_LIMIT,
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub async fn fetch_feed(&self, source_key: &str, url: &str) -> Result<Vec<SourceItem>, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::source(source_key, send_error(e, self.timeout_secs).to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::source(
                source_key,
                format!("HTTP {} from {url}", status.as_u16()),
            ));
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| AppError::source(source_key, format!("Failed to read feed: {e}")))?;

        let items = parse_feed(source_key, &content, self.limit)?;
        tracing::debug!(source = source_key, count = items.len(), "Feed read");
        Ok(items)
    }
}

/// Parse the first `limit` entries of an RSS or Atom document.
fn parse_feed(source_key: &str, content: &[u8], limit: usize) -> Result<Vec<SourceItem>, AppError> {
    let feed = feed_rs::parser::parse(content)
        .map_err(|e| AppError::source(source_key, format!("Unparseable feed: {e}")))?;

    Ok(feed
        .entries
        .into_iter()
        .take(limit)
        .filter_map(|entry| {
            let title = entry.title.map(|t| t.content);
            let link = entry
                .links
                .into_iter()
                .map(|l| l.href)
                .find(|href| !href.trim().is_empty());
            listing_item(source_key, title.as_deref(), link.as_deref())
        })
        .collect())
}
