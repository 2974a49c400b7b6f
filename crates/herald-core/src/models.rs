use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A persisted article. `url` is the dedup key and is unique across the store.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Article {
    pub id: Uuid,
    pub url: String,
    /// Original title as published by the source.
    pub title: String,
    /// Plain-text body extracted from the page.
    pub body: String,
    /// Generated headline. `None` means the article has not been enriched yet.
    pub headline: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// The stored headline, if one exists and is not blank.
    pub fn stored_headline(&self) -> Option<&str> {
        self.headline.as_deref().filter(|h| !h.trim().is_empty())
    }
}

/// A raw item as yielded by a source adapter, before its body is fetched.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceItem {
    pub title: String,
    pub url: String,
    pub category: Option<String>,
}

impl SourceItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            category: category.map(str::to_string),
        }
    }

    /// Attach a validated body, turning the item into a [`Candidate`].
    pub fn into_candidate(self, body: String) -> Candidate {
        Candidate {
            title: self.title,
            url: self.url,
            body,
            category: self.category,
        }
    }
}

/// An article discovered during one ingest run whose body passed validation.
///
/// Never persisted directly; it becomes an [`Article`] through
/// [`ArticleStore::create`](crate::traits::ArticleStore::create).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    pub body: String,
    pub category: Option<String>,
}

/// One record of pipeline output, handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HeadlinedArticle {
    pub title: String,
    pub url: String,
    pub body: String,
    pub headline: String,
}

impl HeadlinedArticle {
    /// Stand-in record shown when a source yields nothing displayable.
    pub fn placeholder(source_key: &str) -> Self {
        Self {
            title: format!("No articles available for {source_key}"),
            url: String::new(),
            body: String::new(),
            headline: "Headlines are temporarily unavailable, check back soon".to_string(),
        }
    }
}
