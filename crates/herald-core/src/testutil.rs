//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Article, Candidate, SourceItem};
use crate::pipeline::{IngestEvent, IngestReporter};
use crate::traits::{ArticleStore, Cleaner, Fetcher, SourceAdapter, Summarizer};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher serving canned pages by URL. Unknown URLs answer HTTP 404.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: Arc<Mutex<HashMap<String, String>>>,
    failures: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), html.to_string());
        self
    }

    /// Make `url` fail with a connection error.
    pub fn with_failure(self, url: &str) -> Self {
        self.failures.lock().unwrap().insert(url.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.failures.lock().unwrap().contains(url) {
            return Err(AppError::NetworkError(format!("Connection failed: {url}")));
        }
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::HttpError(format!("HTTP 404 for {url}")))
    }
}

// ---------------------------------------------------------------------------
// MockCleaner
// ---------------------------------------------------------------------------

/// Mock cleaner that returns its input unchanged.
#[derive(Clone)]
pub struct MockCleaner {
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockCleaner {
    pub fn passthrough() -> Self {
        Self {
            error: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates a cleaner whose first call returns an error.
    pub fn with_error(error: AppError) -> Self {
        Self {
            error: Arc::new(Mutex::new(Some(error))),
        }
    }
}

impl Cleaner for MockCleaner {
    fn clean(&self, html: &str) -> Result<String, AppError> {
        if let Some(e) = self.error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(html.to_string())
    }
}

// ---------------------------------------------------------------------------
// MockAdapter
// ---------------------------------------------------------------------------

/// Mock source adapter returning the same items for every key.
#[derive(Clone)]
pub struct MockAdapter {
    items: Arc<Vec<SourceItem>>,
    error: Arc<Mutex<Option<AppError>>>,
    failing_keys: Arc<Vec<String>>,
}

impl MockAdapter {
    pub fn new(items: Vec<SourceItem>) -> Self {
        Self {
            items: Arc::new(items),
            error: Arc::new(Mutex::new(None)),
            failing_keys: Arc::new(Vec::new()),
        }
    }

    /// Adapter whose first call fails with `error`.
    pub fn with_error(error: AppError) -> Self {
        Self {
            items: Arc::new(Vec::new()),
            error: Arc::new(Mutex::new(Some(error))),
            failing_keys: Arc::new(Vec::new()),
        }
    }

    /// Make every call for `key` fail as unreachable.
    pub fn failing_for(mut self, key: &str) -> Self {
        Arc::make_mut(&mut self.failing_keys).push(key.to_string());
        self
    }
}

impl SourceAdapter for MockAdapter {
    async fn fetch(&self, source_key: &str) -> Result<Vec<SourceItem>, AppError> {
        if let Some(e) = self.error.lock().unwrap().take() {
            return Err(e);
        }
        if self.failing_keys.iter().any(|k| k == source_key) {
            return Err(AppError::source(source_key, "unreachable"));
        }
        Ok(self.items.as_ref().clone())
    }
}

// ---------------------------------------------------------------------------
// MockSummarizer
// ---------------------------------------------------------------------------

/// Mock summarizer with a queue of responses and a call counter.
#[derive(Clone)]
pub struct MockSummarizer {
    responses: Arc<Mutex<VecDeque<Result<String, AppError>>>>,
    fallback: Option<String>,
    delay: Option<Duration>,
    calls: Arc<Mutex<usize>>,
}

impl MockSummarizer {
    /// Answers from `responses` in order, then fails once they run out.
    pub fn new(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            fallback: None,
            delay: None,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Always answers `headline`.
    pub fn always(headline: &str) -> Self {
        Self {
            fallback: Some(headline.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Summarizer for MockSummarizer {
    async fn summarize(&self, _body: &str) -> Result<String, AppError> {
        *self.calls.lock().unwrap() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        match (next, &self.fallback) {
            (Some(response), _) => response,
            (None, Some(headline)) => Ok(headline.clone()),
            (None, None) => Err(AppError::EnrichmentError("no more responses".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

/// In-memory article store enforcing URL uniqueness.
#[derive(Clone)]
pub struct MockStore {
    rows: Arc<Mutex<Vec<Article>>>,
    create_calls: Arc<Mutex<usize>>,
    create_error: Arc<Mutex<Option<AppError>>>,
    find_error: Arc<Mutex<Option<AppError>>>,
}

impl MockStore {
    pub fn empty() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            create_calls: Arc::new(Mutex::new(0)),
            create_error: Arc::new(Mutex::new(None)),
            find_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_article(self, article: Article) -> Self {
        self.rows.lock().unwrap().push(article);
        self
    }

    /// The next `create` call fails with `error`.
    pub fn with_create_error(self, error: AppError) -> Self {
        *self.create_error.lock().unwrap() = Some(error);
        self
    }

    /// The next `find_by_url` call fails with `error`.
    pub fn with_find_error(self, error: AppError) -> Self {
        *self.find_error.lock().unwrap() = Some(error);
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn create_calls(&self) -> usize {
        *self.create_calls.lock().unwrap()
    }

    pub fn find(&self, url: &str) -> Option<Article> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.url == url)
            .cloned()
    }
}

impl ArticleStore for MockStore {
    async fn find_by_url(&self, url: &str) -> Result<Option<Article>, AppError> {
        if let Some(e) = self.find_error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(self.find(url))
    }

    async fn create(&self, candidate: &Candidate, headline: &str) -> Result<Article, AppError> {
        *self.create_calls.lock().unwrap() += 1;
        if let Some(e) = self.create_error.lock().unwrap().take() {
            return Err(e);
        }

        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|a| a.url == candidate.url) {
            return Err(AppError::DuplicateKey(candidate.url.clone()));
        }
        let now = Utc::now();
        let article = Article {
            id: Uuid::new_v4(),
            url: candidate.url.clone(),
            title: candidate.title.clone(),
            body: candidate.body.clone(),
            headline: Some(headline.to_string()),
            category: candidate.category.clone(),
            created_at: now,
            updated_at: now,
        };
        rows.push(article.clone());
        Ok(article)
    }

    async fn update_headline(&self, article: &Article, headline: &str) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|a| a.url == article.url)
            .ok_or_else(|| AppError::DatabaseError(format!("No article for {}", article.url)))?;
        row.headline = Some(headline.to_string());
        row.updated_at = Utc::now();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockReporter
// ---------------------------------------------------------------------------

/// Mock ingest reporter that records event labels.
#[derive(Default)]
pub struct MockReporter {
    pub events: Arc<Mutex<Vec<&'static str>>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IngestReporter for MockReporter {
    fn report(&self, event: IngestEvent<'_>) {
        let label = match &event {
            IngestEvent::RunStarted { .. } => "RunStarted",
            IngestEvent::SourceFailed { .. } => "SourceFailed",
            IngestEvent::CandidatesFound { .. } => "CandidatesFound",
            IngestEvent::CacheHit { .. } => "CacheHit",
            IngestEvent::Rejected { .. } => "Rejected",
            IngestEvent::Enriched { .. } => "Enriched",
            IngestEvent::AlreadyStored { .. } => "AlreadyStored",
            IngestEvent::ItemFailed { .. } => "ItemFailed",
            IngestEvent::RunFinished { .. } => "RunFinished",
        };
        self.events.lock().unwrap().push(label);
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a stored Article for `url`, optionally already headlined.
pub fn make_test_article(url: &str, headline: Option<&str>) -> Article {
    Article {
        id: Uuid::new_v4(),
        url: url.to_string(),
        title: "Stored title".to_string(),
        body: "Stored body".to_string(),
        headline: headline.map(str::to_string),
        category: Some("test_source".to_string()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
