//! The ingest-dedupe-enrich pipeline.
//!
//! For one source at a time: pull items from the [`SourceAdapter`], look each
//! URL up in the [`ArticleStore`], reuse stored headlines, fetch and validate
//! bodies for the rest, generate headlines with the [`Summarizer`] and write
//! the results back one article at a time.
//!
//! ```text
//! Discovered --stored headline--> CacheHit
//!     |
//!     +--------otherwise--------> NeedsEnrichment --> Enriched | Rejected | Failed
//! ```
//!
//! Only an unreadable source fails a run. Every per-article problem is
//! reported and skipped, and the article is picked up again on the next run
//! because its URL is still absent or headline-less.

use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;

use crate::body::Rejected;
use crate::error::AppError;
use crate::models::{Article, Candidate, HeadlinedArticle, SourceItem};
use crate::traits::{ArticleStore, BodyFetcher, SourceAdapter, Summarizer};

/// Timeouts applied to each external call made during a run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound for pulling a source listing.
    pub source_timeout: Duration,
    /// Upper bound for fetching and extracting one article body.
    pub fetch_timeout: Duration,
    /// Upper bound for one headline generation call.
    pub enrich_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(30),
            enrich_timeout: Duration::from_secs(120),
        }
    }
}

/// Terminal state of one item in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ItemStatus {
    /// A stored headline was reused; nothing was fetched or generated.
    CacheHit,
    /// A new headline was generated and written.
    Enriched,
    /// The body was unusable.
    Rejected(String),
    /// Lookup, enrichment or the write failed.
    Failed(String),
}

/// Per-item line of an [`IngestReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub title: String,
    pub url: String,
    #[serde(flatten)]
    pub status: ItemStatus,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub discovered: usize,
    pub cache_hits: usize,
    pub enriched: usize,
    pub rejected: usize,
    pub failed: usize,
}

/// Result of running the pipeline over one source.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub source_key: String,
    /// Emitted records, in the order the source produced them.
    pub articles: Vec<HeadlinedArticle>,
    pub items: Vec<ItemReport>,
    pub stats: IngestStats,
}

impl IngestReport {
    fn new(source_key: &str) -> Self {
        Self {
            source_key: source_key.to_string(),
            articles: Vec::new(),
            items: Vec::new(),
            stats: IngestStats::default(),
        }
    }

    fn record(&mut self, item: &SourceItem, outcome: ItemOutcome) {
        let status = match outcome {
            ItemOutcome::CacheHit(record) => {
                self.stats.cache_hits += 1;
                self.articles.push(record);
                ItemStatus::CacheHit
            }
            ItemOutcome::Enriched(record) => {
                self.stats.enriched += 1;
                self.articles.push(record);
                ItemStatus::Enriched
            }
            ItemOutcome::Rejected(reason) => {
                self.stats.rejected += 1;
                ItemStatus::Rejected(reason.to_string())
            }
            ItemOutcome::Failed(error) => {
                self.stats.failed += 1;
                ItemStatus::Failed(error)
            }
        };
        self.items.push(ItemReport {
            title: item.title.clone(),
            url: item.url.clone(),
            status,
        });
    }
}

enum ItemOutcome {
    CacheHit(HeadlinedArticle),
    Enriched(HeadlinedArticle),
    Rejected(Rejected),
    Failed(String),
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// Events emitted while a run progresses.
#[derive(Debug, Clone)]
pub enum IngestEvent<'a> {
    RunStarted {
        source_key: &'a str,
    },
    SourceFailed {
        source_key: &'a str,
        error: &'a str,
    },
    CandidatesFound {
        source_key: &'a str,
        count: usize,
    },
    CacheHit {
        url: &'a str,
        headline: &'a str,
    },
    Rejected {
        title: &'a str,
        url: &'a str,
        reason: &'a Rejected,
    },
    Enriched {
        url: &'a str,
        headline: &'a str,
        created: bool,
    },
    AlreadyStored {
        url: &'a str,
    },
    ItemFailed {
        title: &'a str,
        url: &'a str,
        error: &'a str,
    },
    RunFinished {
        source_key: &'a str,
        stats: &'a IngestStats,
    },
}

/// Receives pipeline events (decoupled logging).
pub trait IngestReporter: Send + Sync {
    fn report(&self, event: IngestEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingIngestReporter;

impl IngestReporter for TracingIngestReporter {
    fn report(&self, event: IngestEvent<'_>) {
        match event {
            IngestEvent::RunStarted { source_key } => {
                tracing::info!(%source_key, "Pulling candidates");
            }
            IngestEvent::SourceFailed { source_key, error } => {
                tracing::error!(%source_key, %error, "Source unavailable");
            }
            IngestEvent::CandidatesFound { source_key, count } => {
                tracing::info!(%source_key, %count, "Candidates pulled");
            }
            IngestEvent::CacheHit { url, headline } => {
                tracing::info!(%url, %headline, "Stored headline found, skipping enrichment");
            }
            IngestEvent::Rejected { title, url, reason } => {
                tracing::warn!(%title, %url, %reason, "Body rejected");
            }
            IngestEvent::Enriched {
                url,
                headline,
                created,
            } => {
                if created {
                    tracing::info!(%url, %headline, "New article stored");
                } else {
                    tracing::info!(%url, %headline, "Headline added to existing article");
                }
            }
            IngestEvent::AlreadyStored { url } => {
                tracing::info!(%url, "Article inserted concurrently, keeping existing row");
            }
            IngestEvent::ItemFailed { title, url, error } => {
                tracing::warn!(%title, %url, %error, "Article skipped");
            }
            IngestEvent::RunFinished { source_key, stats } => {
                tracing::info!(
                    %source_key,
                    discovered = stats.discovered,
                    cache_hits = stats.cache_hits,
                    enriched = stats.enriched,
                    rejected = stats.rejected,
                    failed = stats.failed,
                    "Run finished"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Orchestrates source → dedup lookup → body fetch → enrichment → write.
///
/// Generic over every collaborator so tests can swap in fakes.
pub struct IngestPipeline<A, B, E, S>
where
    A: SourceAdapter,
    B: BodyFetcher,
    E: Summarizer,
    S: ArticleStore,
{
    adapter: A,
    body_fetcher: B,
    summarizer: E,
    store: S,
    config: PipelineConfig,
}

impl<A, B, E, S> IngestPipeline<A, B, E, S>
where
    A: SourceAdapter,
    B: BodyFetcher,
    E: Summarizer,
    S: ArticleStore,
{
    pub fn new(adapter: A, body_fetcher: B, summarizer: E, store: S) -> Self {
        Self::with_config(adapter, body_fetcher, summarizer, store, PipelineConfig::default())
    }

    pub fn with_config(
        adapter: A,
        body_fetcher: B,
        summarizer: E,
        store: S,
        config: PipelineConfig,
    ) -> Self {
        Self {
            adapter,
            body_fetcher,
            summarizer,
            store,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one source, logging through `tracing`.
    pub async fn run(&self, source_key: &str) -> Result<IngestReport, AppError> {
        self.run_with(source_key, &TracingIngestReporter).await
    }

    /// Run one source, sending progress to `reporter`.
    ///
    /// Returns `Err` only when the source itself cannot be read.
    pub async fn run_with<R: IngestReporter>(
        &self,
        source_key: &str,
        reporter: &R,
    ) -> Result<IngestReport, AppError> {
        reporter.report(IngestEvent::RunStarted { source_key });

        let items = match timeout(self.config.source_timeout, self.adapter.fetch(source_key)).await
        {
            Ok(Ok(items)) => items,
            Ok(Err(e)) => {
                let error = e.to_string();
                reporter.report(IngestEvent::SourceFailed {
                    source_key,
                    error: &error,
                });
                return Err(e);
            }
            Err(_) => {
                let e = AppError::source(
                    source_key,
                    format!(
                        "timed out after {}s",
                        self.config.source_timeout.as_secs()
                    ),
                );
                let error = e.to_string();
                reporter.report(IngestEvent::SourceFailed {
                    source_key,
                    error: &error,
                });
                return Err(e);
            }
        };

        reporter.report(IngestEvent::CandidatesFound {
            source_key,
            count: items.len(),
        });

        let mut report = IngestReport::new(source_key);
        report.stats.discovered = items.len();

        for item in items {
            let outcome = self.process_item(&item, reporter).await;
            report.record(&item, outcome);
        }

        reporter.report(IngestEvent::RunFinished {
            source_key,
            stats: &report.stats,
        });

        Ok(report)
    }

    /// Run several sources one after another. A failing source does not stop
    /// the others.
    pub async fn run_all<'k, I>(&self, source_keys: I) -> Vec<(String, Result<IngestReport, AppError>)>
    where
        I: IntoIterator<Item = &'k str>,
    {
        let mut runs = Vec::new();
        for key in source_keys {
            let result = self.run(key).await;
            runs.push((key.to_string(), result));
        }
        runs
    }

    async fn process_item<R: IngestReporter>(&self, item: &SourceItem, reporter: &R) -> ItemOutcome {
        let existing = match self.store.find_by_url(&item.url).await {
            Ok(existing) => existing,
            Err(e) => return self.fail(item, e.to_string(), reporter),
        };

        if let Some(article) = &existing
            && let Some(headline) = article.stored_headline()
        {
            reporter.report(IngestEvent::CacheHit {
                url: &item.url,
                headline,
            });
            return ItemOutcome::CacheHit(HeadlinedArticle {
                title: item.title.clone(),
                url: item.url.clone(),
                body: article.body.clone(),
                headline: headline.to_string(),
            });
        }

        let body = match timeout(
            self.config.fetch_timeout,
            self.body_fetcher.fetch_body(&item.url),
        )
        .await
        {
            Ok(Ok(body)) => body,
            Ok(Err(reason)) => return self.reject(item, reason, reporter),
            Err(_) => {
                let reason = Rejected::FetchFailed(format!(
                    "timed out after {}s",
                    self.config.fetch_timeout.as_secs()
                ));
                return self.reject(item, reason, reporter);
            }
        };

        let candidate = item.clone().into_candidate(body);

        let headline = match timeout(
            self.config.enrich_timeout,
            self.summarizer.summarize(&candidate.body),
        )
        .await
        {
            Ok(Ok(headline)) => headline,
            Ok(Err(e)) => return self.fail(item, e.to_string(), reporter),
            Err(_) => {
                let e = AppError::Timeout(self.config.enrich_timeout.as_secs());
                return self.fail(item, e.to_string(), reporter);
            }
        };

        if let Err(e) = self.persist(existing.as_ref(), &candidate, &headline, reporter).await {
            return self.fail(item, e.to_string(), reporter);
        }

        ItemOutcome::Enriched(HeadlinedArticle {
            title: candidate.title,
            url: candidate.url,
            body: candidate.body,
            headline,
        })
    }

    async fn persist<R: IngestReporter>(
        &self,
        existing: Option<&Article>,
        candidate: &Candidate,
        headline: &str,
        reporter: &R,
    ) -> Result<(), AppError> {
        match existing {
            Some(article) => {
                self.store.update_headline(article, headline).await?;
                reporter.report(IngestEvent::Enriched {
                    url: &candidate.url,
                    headline,
                    created: false,
                });
            }
            None => match self.store.create(candidate, headline).await {
                Ok(_) => reporter.report(IngestEvent::Enriched {
                    url: &candidate.url,
                    headline,
                    created: true,
                }),
                Err(AppError::DuplicateKey(_)) => {
                    reporter.report(IngestEvent::AlreadyStored {
                        url: &candidate.url,
                    });
                }
                Err(e) => return Err(e),
            },
        }
        Ok(())
    }

    fn reject<R: IngestReporter>(
        &self,
        item: &SourceItem,
        reason: Rejected,
        reporter: &R,
    ) -> ItemOutcome {
        reporter.report(IngestEvent::Rejected {
            title: &item.title,
            url: &item.url,
            reason: &reason,
        });
        ItemOutcome::Rejected(reason)
    }

    fn fail<R: IngestReporter>(&self, item: &SourceItem, error: String, reporter: &R) -> ItemOutcome {
        reporter.report(IngestEvent::ItemFailed {
            title: &item.title,
            url: &item.url,
            error: &error,
        });
        ItemOutcome::Failed(error)
    }
}
