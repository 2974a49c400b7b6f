use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use herald_core::models::{Article, HeadlinedArticle};
use herald_core::pipeline::IngestStats;
use herald_core::source::SourceSpec;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SourceResponse {
    pub key: String,
    /// `aggregator`, `feed` or `search`.
    pub kind: &'static str,
    pub spec: serde_json::Value,
}

impl SourceResponse {
    pub fn new(key: &str, spec: &SourceSpec) -> Self {
        Self {
            key: key.to_string(),
            kind: spec.kind(),
            spec: serde_json::to_value(spec).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SourceListResponse {
    pub sources: Vec<SourceResponse>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Headlines
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HeadlineResponse {
    pub title: String,
    pub url: String,
    pub body: String,
    pub headline: String,
}

impl From<HeadlinedArticle> for HeadlineResponse {
    fn from(article: HeadlinedArticle) -> Self {
        Self {
            title: article.title,
            url: article.url,
            body: article.body,
            headline: article.headline,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct IngestStatsResponse {
    pub discovered: usize,
    pub cache_hits: usize,
    pub enriched: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl From<IngestStats> for IngestStatsResponse {
    fn from(stats: IngestStats) -> Self {
        Self {
            discovered: stats.discovered,
            cache_hits: stats.cache_hits,
            enriched: stats.enriched,
            rejected: stats.rejected,
            failed: stats.failed,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HeadlinesResponse {
    pub source: String,
    /// True when `articles` holds a placeholder instead of real results.
    pub degraded: bool,
    pub articles: Vec<HeadlineResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<IngestStatsResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ArticleListQuery {
    /// Source key the article was ingested from.
    pub category: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ArticleResponse {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub headline: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            url: article.url,
            title: article.title,
            headline: article.headline,
            category: article.category,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleResponse>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    /// Whether headline ingestion is configured.
    pub ingest: bool,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
