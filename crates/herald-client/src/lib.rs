pub mod cleaner;
pub mod fetcher;
pub mod http;
pub mod llm;
pub mod sources;

pub use cleaner::TextCleaner;
pub use fetcher::ReqwestFetcher;
pub use llm::OpenAiSummarizer;
pub use sources::{AggregatorAdapter, FeedAdapter, NewsApiAdapter, SourceRouter};
