use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// How to reach one configured source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSpec {
    /// A link aggregator community (a subreddit).
    Aggregator { subreddit: String },
    /// An RSS or Atom feed.
    Feed { url: String },
    /// A headline-search API query; every filter is optional.
    Search {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        country: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query: Option<String>,
    },
}

impl SourceSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceSpec::Aggregator { .. } => "aggregator",
            SourceSpec::Feed { .. } => "feed",
            SourceSpec::Search { .. } => "search",
        }
    }
}

/// Mapping from source key to [`SourceSpec`], loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceCatalog {
    sources: BTreeMap<String, SourceSpec>,
}

/// Feed keys keep their historical spelling since stored rows carry them as
/// their category. Repeated URLs are listed once.
const BUILTIN_FEEDS: &[(&str, &str)] = &[
    ("bbc_world", "https://feeds.bbci.co.uk/news/world/rss.xml"),
    ("bbc_business", "https://feeds.bbci.co.uk/news/business/rss.xml"),
    ("bbc_sports", "https://feeds.bbci.co.uk/sport/rss.xml"),
    ("bbc_politics", "https://feeds.bbci.co.uk/news/politics/rss.xml"),
    ("bbc_health", "https://feeds.bbci.co.uk/news/health/rss.xml"),
    ("bbc_education", "https://feeds.bbci.co.uk/news/education/rss.xml"),
    (
        "bbc_science_and_environment",
        "https://feeds.bbci.co.uk/news/science_and_environment/rss.xml",
    ),
    ("bbc_technology", "https://feeds.bbci.co.uk/news/technology/rss.xml"),
    ("bbc_entertainment_and_arts", "https://feeds.bbci.co.uk/news/entertainment_and_arts/rss.xml"),
    ("foxnews_tech", "https://moxie.foxnews.com/google-publisher/tech.xml"),
    ("foxnews_latest_all_sections", "https://moxie.foxnews.com/google-publisher/latest.xml"),
    ("foxnews_World", "https://moxie.foxnews.com/google-publisher/world.xml"),
    ("foxnews_Politics", "https://moxie.foxnews.com/google-publisher/politics.xml"),
    ("foxnews_Science", "https://moxie.foxnews.com/google-publisher/science.xml"),
    ("foxnews_Health", "https://moxie.foxnews.com/google-publisher/health.xml"),
    ("foxnews_Sports", "https://moxie.foxnews.com/google-publisher/sports.xml"),
    ("foxnews_Travel", "https://moxie.foxnews.com/google-publisher/travel.xml"),
    ("foxnews_Opinion", "https://moxie.foxnews.com/google-publisher/opinion.xml"),
    ("foxnews_Video", "https://moxie.foxnews.com/google-publisher/videos.xml"),
    ("foxnews_us", "https://moxie.foxnews.com/google-publisher/us.xml"),
    ("Skynews_home", "https://feeds.skynews.com/feeds/rss/home.xml"),
    ("Skynews_uk", "http://feeds.skynews.com/feeds/rss/uk.xml"),
    ("Skynews_world", "http://feeds.skynews.com/feeds/rss/world.xml"),
    ("Skynews_us", "http://feeds.skynews.com/feeds/rss/us.xml"),
    ("Skynews_business", "http://feeds.skynews.com/feeds/rss/business.xml"),
    ("Skynews_politics", "http://feeds.skynews.com/feeds/rss/politics.xml"),
    ("Skynews_technology", "http://feeds.skynews.com/feeds/rss/technology.xml"),
    ("Skynews_entertainment", "http://feeds.skynews.com/feeds/rss/entertainment.xml"),
    ("Skynews_strange_news", "https://feeds.skynews.com/feeds/rss/strange.xml"),
    ("euronews", "https://www.euronews.com/rss"),
    ("abcnews_top_stories", "https://abcnews.go.com/abcnews/topstories"),
    ("abcnews_US_Headlines", "https://feeds.abcnews.com/abcnews/usheadlines"),
    ("abcnews_nternational_headlines", "https://feeds.abcnews.com/abcnews/internationalheadlines"),
    ("abcnews_Politics_headlines", "https://feeds.abcnews.com/abcnews/politicsheadlines"),
    ("abcnews_Business_headlines", "https://feeds.abcnews.com/abcnews/moneyheadlines"),
    ("abcnews_technology_headlines", "https://feeds.abcnews.com/abcnews/technologyheadlines"),
    ("abcnews_Health_headlines", "https://feeds.abcnews.com/abcnews/healthheadlines"),
    ("abcnews_entertainment_headlines", "https://feeds.abcnews.com/abcnews/entertainmentheadlines"),
    ("abcnews_travel_headlines", "https://feeds.abcnews.com/abcnews/travelheadlines"),
    ("abcnews_ESPN_sports", "https://feeds.abcnews.com/abcnews/sportsheadlines"),
    ("abcnews_World_news_headlines", "https://feeds.abcnews.com/abcnews/worldnewsheadlines"),
    ("abcnews_Good_Morning_America_headlines", "https://feeds.abcnews.com/abcnews/gmaheadlines"),
    ("abcnews_20/20_headlines", "https://feeds.abcnews.com/abcnews/2020headlines"),
    ("abcnews_primetime_headlines", "https://feeds.abcnews.com/abcnews/primetimeheadlines"),
    ("abcnews_nighttime_headlines", "https://feeds.abcnews.com/abcnews/nightlineheadlines"),
    ("abcnews_this_week_headlines", "https://feeds.abcnews.com/abcnews/thisweekheadlines"),
    ("abcnews_most_read_stories", "https://feeds.abcnews.com/abcnews/mostreadstories"),
    ("abcnews_most_viewed_videos", "https://feeds.abcnews.com/abcnews/mostviewedvideos"),
    ("abcnews_most_viewed_slideshows", "https://feeds.abcnews.com/abcnews/mostviewedslideshows"),
];

impl SourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog used when no sources file is given.
    pub fn builtin() -> Self {
        let mut catalog = Self::new().with_source(
            "world_news",
            SourceSpec::Aggregator {
                subreddit: "worldnews".to_string(),
            },
        );
        for (key, url) in BUILTIN_FEEDS {
            catalog.insert(
                key,
                SourceSpec::Feed {
                    url: url.to_string(),
                },
            );
        }
        catalog
    }

    /// Load a catalog from a JSON file of the form
    /// `{"key": {"kind": "feed", "url": "..."}, ...}`.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!(
                "Failed to read sources file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&raw).map_err(|e| {
            AppError::ConfigError(format!("Invalid sources file {}: {e}", path.display()))
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let catalog: SourceCatalog = serde_json::from_str(raw)?;
        if let Some(key) = catalog.sources.keys().find(|k| k.trim().is_empty()) {
            return Err(AppError::ConfigError(format!(
                "Source keys must not be blank, got {key:?}"
            )));
        }
        Ok(catalog)
    }

    pub fn with_source(mut self, key: &str, spec: SourceSpec) -> Self {
        self.insert(key, spec);
        self
    }

    pub fn insert(&mut self, key: &str, spec: SourceSpec) {
        self.sources.insert(key.to_string(), spec);
    }

    pub fn get(&self, key: &str) -> Option<&SourceSpec> {
        self.sources.get(key)
    }

    /// Look up a key, failing with [`AppError::UnknownSource`].
    pub fn resolve(&self, key: &str) -> Result<&SourceSpec, AppError> {
        self.get(key)
            .ok_or_else(|| AppError::UnknownSource(key.to_string()))
    }

    /// Source keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceSpec)> {
        self.sources.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
