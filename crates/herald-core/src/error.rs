use thiserror::Error;

/// Application-wide error types for Herald.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a page or a source listing).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// LLM API call failed.
    #[error("LLM error (HTTP {status_code}): {message}")]
    LlmError { message: String, status_code: u16 },

    /// The enrichment call completed but produced no usable headline.
    #[error("Enrichment error: {0}")]
    EnrichmentError(String),

    /// A configured source could not be read or parsed.
    #[error("Source '{source_key}' unavailable: {message}")]
    SourceError { source_key: String, message: String },

    /// No source is configured under the requested key.
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Insert rejected because an article with this URL already exists.
    #[error("Article already exists: {0}")]
    DuplicateKey(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if this error means the whole source could not be read,
    /// as opposed to a single article failing.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            AppError::SourceError { .. } | AppError::UnknownSource(_)
        )
    }

    /// Shorthand for building a [`AppError::SourceError`].
    pub fn source(source_key: &str, message: impl Into<String>) -> Self {
        AppError::SourceError {
            source_key: source_key.to_string(),
            message: message.into(),
        }
    }
}
