//! Source adapters: one per kind of [`SourceSpec`], plus a router that
//! resolves a source key against the catalog and dispatches to the right one.

mod feed;
mod reddit;
mod search;

use std::sync::Arc;

use herald_core::error::AppError;
use herald_core::models::SourceItem;
use herald_core::source::{SourceCatalog, SourceSpec};
use herald_core::traits::SourceAdapter;
use url::Url;

pub use feed::{DEFAULT_FEED_LIMIT, FeedAdapter};
pub use reddit::{AggregatorAdapter, DEFAULT_AGGREGATOR_LIMIT, is_self_referential};
pub use search::{DEFAULT_SEARCH_LIMIT, NewsApiAdapter};

/// Dispatches a source key to the adapter for its kind.
///
/// Search sources need an API key; without a [`NewsApiAdapter`] they fail as
/// a source error rather than at startup.
#[derive(Clone)]
pub struct SourceRouter {
    catalog: Arc<SourceCatalog>,
    aggregator: AggregatorAdapter,
    feed: FeedAdapter,
    search: Option<NewsApiAdapter>,
}

impl SourceRouter {
    pub fn new(catalog: Arc<SourceCatalog>) -> Result<Self, AppError> {
        Ok(Self {
            catalog,
            aggregator: AggregatorAdapter::new()?,
            feed: FeedAdapter::new()?,
            search: None,
        })
    }

    pub fn with_search(mut self, search: NewsApiAdapter) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_aggregator(mut self, aggregator: AggregatorAdapter) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn with_feed(mut self, feed: FeedAdapter) -> Self {
        self.feed = feed;
        self
    }

    pub fn catalog(&self) -> &SourceCatalog {
        &self.catalog
    }
}

impl SourceAdapter for SourceRouter {
    async fn fetch(&self, source_key: &str) -> Result<Vec<SourceItem>, AppError> {
        match self.catalog.resolve(source_key)? {
            SourceSpec::Aggregator { subreddit } => {
                self.aggregator.fetch_hot(source_key, subreddit).await
            }
            SourceSpec::Feed { url } => self.feed.fetch_feed(source_key, url).await,
            SourceSpec::Search {
                country,
                category,
                query,
            } => match &self.search {
                Some(search) => {
                    search
                        .fetch_top_headlines(
                            source_key,
                            country.as_deref(),
                            category.as_deref(),
                            query.as_deref(),
                        )
                        .await
                }
                None => Err(AppError::source(
                    source_key,
                    "search sources need NEWSAPI_KEY to be set",
                )),
            },
        }
    }
}

/// Build a [`SourceItem`] from a raw listing entry, or `None` with a warning
/// when the title is blank or the link is not an absolute http(s) URL.
pub(crate) fn listing_item(
    source_key: &str,
    title: Option<&str>,
    link: Option<&str>,
) -> Option<SourceItem> {
    let title = title.map(str::trim).filter(|t| !t.is_empty());
    let link = link.map(str::trim).filter(|l| !l.is_empty());

    let (Some(title), Some(link)) = (title, link) else {
        tracing::warn!(
            source = source_key,
            ?title,
            ?link,
            "Skipping entry without title or link"
        );
        return None;
    };

    match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            Some(SourceItem::new(title, link, Some(source_key)))
        }
        Ok(url) => {
            tracing::warn!(source = source_key, link, scheme = url.scheme(), "Skipping non-web link");
            None
        }
        Err(e) => {
            tracing::warn!(source = source_key, link, error = %e, "Skipping unparseable link");
            None
        }
    }
}
