use std::time::Duration;

use herald_core::error::AppError;
use herald_core::models::SourceItem;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::listing_item;
use crate::http::{API_USER_AGENT, DEFAULT_TIMEOUT, build_client, send_error};

pub const DEFAULT_SEARCH_LIMIT: usize = 10;
const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

/// Title the provider substitutes for withdrawn articles.
const REMOVED_MARKER: &str = "[Removed]";

/// Top-headlines query against a NewsAPI-compatible service.
#[derive(Clone)]
pub struct NewsApiAdapter {
    client: Client,
    base_url: String,
    api_key: String,
    limit: usize,
    timeout_secs: u64,
}

impl NewsApiAdapter {
    pub fn new(api_key: &str) -> Result<Self, AppError> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(api_key: &str, timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(API_USER_AGENT, timeout)?,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            limit: DEFAULT_SEARCH_LIMIT,
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

    fn top_headlines_url(
        &self,
        country: Option<&str>,
        category: Option<&str>,
        query: Option<&str>,
    ) -> Result<Url, AppError> {
        let page_size = self.limit.to_string();
        let mut params = vec![("pageSize", page_size.as_str())];
        params.extend(country.map(|c| ("country", c)));
        params.extend(category.map(|c| ("category", c)));
        params.extend(query.map(|q| ("q", q)));

        Url::parse_with_params(&format!("{}/top-headlines", self.base_url), &params)
            .map_err(|e| AppError::ConfigError(format!("Invalid search URL: {e}")))
    }

    pub async fn fetch_top_headlines(
        &self,
        source_key: &str,
        country: Option<&str>,
        category: Option<&str>,
        query: Option<&str>,
    ) -> Result<Vec<SourceItem>, AppError> {
        let url = self.top_headlines_url(country, category, query)?;

        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::source(source_key, send_error(e, self.timeout_secs).to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| AppError::source(source_key, format!("Failed to read response: {e}")))?;

        let parsed: SearchResponse = serde_json::from_str(&raw).map_err(|e| {
            AppError::source(
                source_key,
                format!("HTTP {}: invalid response: {e}", status.as_u16()),
            )
        })?;

        let items = parse_response(source_key, parsed, self.limit)?;
        tracing::debug!(source = source_key, count = items.len(), "Search results read");
        Ok(items)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    /// Decoded one by one so a malformed article only costs that entry.
    #[serde(default)]
    articles: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct SearchArticle {
    title: Option<String>,
    url: Option<String>,
}

fn parse_response(
    source_key: &str,
    response: SearchResponse,
    limit: usize,
) -> Result<Vec<SourceItem>, AppError> {
    if response.status != "ok" {
        return Err(AppError::source(
            source_key,
            response
                .message
                .unwrap_or_else(|| format!("provider status '{}'", response.status)),
        ));
    }

    Ok(response
        .articles
        .into_iter()
        .take(limit)
        .filter_map(|raw| match serde_json::from_value::<SearchArticle>(raw) {
            Ok(article) => Some(article),
            Err(e) => {
                tracing::warn!(source = source_key, error = %e, "Skipping malformed article");
                None
            }
        })
        .filter(|a| a.title.as_deref().map(str::trim) != Some(REMOVED_MARKER))
        .filter_map(|a| listing_item(source_key, a.title.as_deref(), a.url.as_deref()))
        .collect())
}
