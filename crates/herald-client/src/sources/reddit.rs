use std::time::Duration;

use herald_core::error::AppError;
use herald_core::models::SourceItem;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::listing_item;
use crate::http::{API_USER_AGENT, DEFAULT_TIMEOUT, build_client, send_error};

pub const DEFAULT_AGGREGATOR_LIMIT: usize = 12;
const DEFAULT_BASE_URL: &str = "https://www.reddit.com";

/// Reads the "hot" listing of a subreddit through the public JSON endpoint.
#[derive(Clone)]
pub struct AggregatorAdapter {
    client: Client,
    base_url: String,
    limit: usize,
    timeout_secs: u64,
}

impl AggregatorAdapter {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(API_USER_AGENT, timeout)?,
            base_url: DEFAULT_BASE_URL.to_string(),
            limit: DEFAULT_AGGREGATOR_LIMIT,
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn listing_url(&self, subreddit: &str) -> Result<Url, AppError> {
        let limit = self.limit.to_string();
        Url::parse_with_params(
            &format!("{}/r/{}/hot.json", self.base_url, subreddit),
            &[("limit", limit.as_str()), ("raw_json", "1")],
        )
        .map_err(|e| AppError::ConfigError(format!("Invalid subreddit URL: {e}")))
    }

    pub async fn fetch_hot(
        &self,
        source_key: &str,
        subreddit: &str,
    ) -> Result<Vec<SourceItem>, AppError> {
        let url = self.listing_url(subreddit)?;

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
                format!("HTTP {} from r/{subreddit}", status.as_u16()),
            ));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| AppError::source(source_key, format!("Invalid listing: {e}")))?;

        let items = parse_listing(source_key, listing, self.limit);
        tracing::debug!(source = source_key, subreddit, count = items.len(), "Listing read");
        Ok(items)
    }
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    /// Decoded one by one so a malformed child only costs that entry.
    #[serde(default)]
    children: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct Child {
    data: Post,
}

#[derive(Deserialize)]
struct Post {
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    is_self: bool,
}

/// Cap the listing, then drop posts that link back into the aggregator.
fn parse_listing(source_key: &str, listing: Listing, limit: usize) -> Vec<SourceItem> {
    listing
        .data
        .children
        .into_iter()
        .take(limit)
        .filter_map(|raw| {
            let post = match serde_json::from_value::<Child>(raw) {
                Ok(child) => child.data,
                Err(e) => {
                    tracing::warn!(source = source_key, error = %e, "Skipping malformed post");
                    return None;
                }
            };
            let link = post.url.as_deref().map(str::trim).unwrap_or_default();
            if post.is_self || is_self_referential(link) {
                tracing::debug!(source = source_key, link, "Skipping self-referential post");
                return None;
            }
            listing_item(source_key, post.title.as_deref(), post.url.as_deref())
        })
        .collect()
}

/// True for links that stay on the aggregator: relative paths, reddit.com
/// and its subdomains, and the redd.it short/media hosts.
pub fn is_self_referential(link: &str) -> bool {
    if link.starts_with('/') {
        return true;
    }
    let Ok(url) = Url::parse(link) else {
        return false;
    };
    url.host_str().is_some_and(|host| {
        let host = host.to_ascii_lowercase();
        ["reddit.com", "redd.it"]
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{d}")))
    })
}
