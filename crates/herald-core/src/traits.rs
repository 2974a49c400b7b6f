use std::future::Future;

use chrono::Utc;
use uuid::Uuid;

use crate::body::Rejected;
use crate::error::AppError;
use crate::models::{Article, Candidate, SourceItem};

/// Fetches raw HTML content from a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Extracts the visible text from raw HTML.
pub trait Cleaner: Send + Sync + Clone {
    fn clean(&self, html: &str) -> Result<String, AppError>;
}

/// Produces candidate items for a configured source.
pub trait SourceAdapter: Send + Sync + Clone {
    /// Pull the current items for `source_key`, capped per adapter.
    ///
    /// Malformed entries are skipped, not reported; an `Err` means the
    /// source as a whole could not be read.
    fn fetch(
        &self,
        source_key: &str,
    ) -> impl Future<Output = Result<Vec<SourceItem>, AppError>> + Send;
}

/// Retrieves and validates the plain-text body of an article page.
pub trait BodyFetcher: Send + Sync + Clone {
    fn fetch_body(&self, url: &str) -> impl Future<Output = Result<String, Rejected>> + Send;
}

/// Generates a short headline for an article body.
pub trait Summarizer: Send + Sync + Clone {
    fn summarize(&self, body: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Persists and retrieves articles keyed by URL.
pub trait ArticleStore: Send + Sync + Clone {
    /// Exact-match lookup on URL.
    fn find_by_url(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Option<Article>, AppError>> + Send;

    /// Insert a new article. Fails with [`AppError::DuplicateKey`] when a row
    /// with the same URL already exists.
    fn create(
        &self,
        candidate: &Candidate,
        headline: &str,
    ) -> impl Future<Output = Result<Article, AppError>> + Send;

    /// Set the headline on an existing, headline-less article.
    fn update_headline(
        &self,
        article: &Article,
        headline: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// An ArticleStore that remembers nothing. Every URL looks new and every
/// write succeeds, which turns a pipeline run into a dry run.
#[derive(Debug, Clone)]
pub struct NullStore;

impl ArticleStore for NullStore {
    async fn find_by_url(&self, _url: &str) -> Result<Option<Article>, AppError> {
        Ok(None)
    }

    async fn create(&self, candidate: &Candidate, headline: &str) -> Result<Article, AppError> {
        let now = Utc::now();
        Ok(Article {
            id: Uuid::nil(),
            url: candidate.url.clone(),
            title: candidate.title.clone(),
            body: candidate.body.clone(),
            headline: Some(headline.to_string()),
            category: candidate.category.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_headline(&self, _article: &Article, _headline: &str) -> Result<(), AppError> {
        Ok(())
    }
}
