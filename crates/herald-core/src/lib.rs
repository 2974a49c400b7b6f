pub mod body;
pub mod error;
pub mod headline;
pub mod models;
pub mod pipeline;
pub mod source;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

pub use body::{DEFAULT_MIN_BODY_CHARS, PageBodyFetcher, Rejected};
pub use error::AppError;
pub use headline::HeadlinePrompt;
pub use models::{Article, Candidate, HeadlinedArticle, SourceItem};
pub use pipeline::{IngestPipeline, IngestReport, PipelineConfig};
pub use source::{SourceCatalog, SourceSpec};
pub use traits::{ArticleStore, BodyFetcher, Cleaner, Fetcher, NullStore, SourceAdapter, Summarizer};
