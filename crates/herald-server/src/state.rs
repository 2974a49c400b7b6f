use std::sync::Arc;

use herald_client::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use herald_client::{NewsApiAdapter, OpenAiSummarizer, ReqwestFetcher, SourceRouter, TextCleaner};
use herald_core::headline::{DEFAULT_WORD_BUDGET, HeadlinePrompt};
use herald_core::{AppError, DEFAULT_MIN_BODY_CHARS, IngestPipeline, PageBodyFetcher, SourceCatalog};
use herald_db::{ArticleRepository, Database};

/// The production pipeline: catalog sources, page bodies, OpenAI headlines, Postgres.
pub type Ingest = IngestPipeline<
    SourceRouter,
    PageBodyFetcher<ReqwestFetcher, TextCleaner>,
    OpenAiSummarizer,
    ArticleRepository,
>;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    pub catalog: Arc<SourceCatalog>,
    /// `None` when no LLM key is configured; headline ingestion is then disabled.
    pub ingest: Option<Ingest>,
}

/// Settings needed to build an [`Ingest`] pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub newsapi_key: Option<String>,
    pub min_body_chars: usize,
    pub word_budget: usize,
    pub allow_private_urls: bool,
}

impl PipelineSettings {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            newsapi_key: None,
            min_body_chars: DEFAULT_MIN_BODY_CHARS,
            word_budget: DEFAULT_WORD_BUDGET,
            allow_private_urls: false,
        }
    }

    /// Read settings from the environment.
    ///
    /// Returns `Ok(None)` when `OPENAI_API_KEY` is unset.
    pub fn from_env() -> Result<Option<Self>, AppError> {
        let Some(api_key) = non_empty_var("OPENAI_API_KEY") else {
            return Ok(None);
        };

        let mut settings = Self::new(&api_key);
        if let Some(model) = non_empty_var("HERALD_MODEL") {
            settings.model = model;
        }
        if let Some(base_url) = non_empty_var("HERALD_BASE_URL") {
            settings.base_url = base_url;
        }
        settings.newsapi_key = non_empty_var("NEWSAPI_KEY");
        if let Some(raw) = non_empty_var("HERALD_MIN_BODY_CHARS") {
            settings.min_body_chars = parse_count("HERALD_MIN_BODY_CHARS", &raw)?;
        }
        if let Some(raw) = non_empty_var("HERALD_WORD_BUDGET") {
            settings.word_budget = parse_count("HERALD_WORD_BUDGET", &raw)?;
        }
        settings.allow_private_urls =
            non_empty_var("HERALD_ALLOW_PRIVATE_URLS").is_some_and(|v| v == "1" || v == "true");

        Ok(Some(settings))
    }

    pub fn build(
        &self,
        catalog: Arc<SourceCatalog>,
        repo: ArticleRepository,
    ) -> Result<Ingest, AppError> {
        let mut router = SourceRouter::new(catalog)?;
        if let Some(key) = &self.newsapi_key {
            router = router.with_search(NewsApiAdapter::new(key)?);
        }

        let mut fetcher = ReqwestFetcher::new()?;
        if self.allow_private_urls {
            fetcher = fetcher.allow_private_urls();
        }
        let body_fetcher =
            PageBodyFetcher::new(fetcher, TextCleaner::new()).with_min_chars(self.min_body_chars);

        let summarizer = OpenAiSummarizer::with_base_url(&self.api_key, &self.model, &self.base_url)?
            .with_prompt(HeadlinePrompt::new(self.word_budget));

        Ok(IngestPipeline::new(router, body_fetcher, summarizer, repo))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_count(name: &str, raw: &str) -> Result<usize, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::ConfigError(format!("Invalid {name} '{raw}': must be a non-negative integer")))
}
