use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use herald_client::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use herald_client::{NewsApiAdapter, OpenAiSummarizer, ReqwestFetcher, SourceRouter, TextCleaner};
use herald_core::headline::{DEFAULT_WORD_BUDGET, HeadlinePrompt};
use herald_core::models::HeadlinedArticle;
use herald_core::pipeline::IngestReport;
use herald_core::traits::ArticleStore;
use herald_core::{
    AppError, DEFAULT_MIN_BODY_CHARS, IngestPipeline, NullStore, PageBodyFetcher, SourceCatalog,
    SourceSpec,
};
use herald_db::{Database, DatabaseConfig};

type PageFetcher = PageBodyFetcher<ReqwestFetcher, TextCleaner>;
type Pipeline<S> = IngestPipeline<SourceRouter, PageFetcher, OpenAiSummarizer, S>;

#[derive(Parser)]
#[command(name = "herald", version, about = "News headline digest: ingest, dedupe, enrich")]
struct Cli {
    /// JSON source catalog (defaults to the built-in catalog)
    #[arg(long = "sources", global = true, env = "HERALD_SOURCES")]
    sources_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull sources, generate missing headlines and print the results as JSON
    Ingest {
        /// Source key to ingest (repeatable)
        #[arg(short, long = "source", required_unless_present = "all")]
        source: Vec<String>,

        /// Ingest every source in the catalog
        #[arg(long, default_value_t = false, conflicts_with = "source")]
        all: bool,

        /// LLM model used for headlines
        #[arg(short, long, env = "HERALD_MODEL", default_value = DEFAULT_MODEL)]
        model: String,

        /// OpenAI-compatible API base URL
        #[arg(short, long, env = "HERALD_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// API key for the LLM endpoint
        #[arg(short, long, env = "OPENAI_API_KEY")]
        api_key: String,

        /// API key for search sources
        #[arg(long, env = "NEWSAPI_KEY")]
        newsapi_key: Option<String>,

        /// Bodies shorter than this many characters are rejected
        #[arg(long, env = "HERALD_MIN_BODY_CHARS", default_value_t = DEFAULT_MIN_BODY_CHARS)]
        min_body_chars: usize,

        /// Headlines are asked to stay under this many words
        #[arg(long, env = "HERALD_WORD_BUDGET", default_value_t = DEFAULT_WORD_BUDGET)]
        word_budget: usize,

        /// Allow fetching article pages on private/reserved addresses
        #[arg(long, default_value_t = false)]
        allow_private_urls: bool,

        /// Skip the database: nothing is looked up or stored
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Print per-item statuses and counters instead of just the articles
        #[arg(long, default_value_t = false)]
        report: bool,
    },

    /// List the configured sources
    Sources,

    /// Show recently stored articles
    Articles {
        /// Only articles from this source key
        #[arg(short, long)]
        category: Option<String>,

        /// Number of articles to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("herald=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let catalog = load_catalog(cli.sources_file.as_deref())?;

    match cli.command {
        Commands::Ingest {
            source,
            all,
            model,
            base_url,
            api_key,
            newsapi_key,
            min_body_chars,
            word_budget,
            allow_private_urls,
            dry_run,
            report,
        } => {
            let keys = resolve_keys(&catalog, source, all)?;

            let mut router = SourceRouter::new(Arc::new(catalog))?;
            if let Some(key) = newsapi_key.filter(|k| !k.trim().is_empty()) {
                router = router.with_search(NewsApiAdapter::new(&key)?);
            }

            let mut fetcher = ReqwestFetcher::new().context("Failed to create HTTP client")?;
            if allow_private_urls {
                fetcher = fetcher.allow_private_urls();
            }
            let body_fetcher =
                PageBodyFetcher::new(fetcher, TextCleaner::new()).with_min_chars(min_body_chars);

            let summarizer = OpenAiSummarizer::with_base_url(&api_key, &model, &base_url)?
                .with_prompt(HeadlinePrompt::new(word_budget));

            tracing::info!(sources = keys.len(), %model, dry_run, "Starting ingest");

            if dry_run {
                let pipeline = IngestPipeline::new(router, body_fetcher, summarizer, NullStore);
                cmd_ingest(&pipeline, &keys, report).await?;
            } else {
                let db = connect_db().await?;
                let pipeline =
                    IngestPipeline::new(router, body_fetcher, summarizer, db.article_repo());
                cmd_ingest(&pipeline, &keys, report).await?;
            }
        }
        Commands::Sources => cmd_sources(&catalog),
        Commands::Articles { category, limit } => {
            let db = connect_db().await?;
            cmd_articles(&db, category.as_deref(), limit).await?;
        }
    }

    Ok(())
}

fn load_catalog(path: Option<&Path>) -> Result<SourceCatalog> {
    match path {
        Some(path) => {
            let catalog = SourceCatalog::from_file(path)?;
            tracing::info!(path = %path.display(), sources = catalog.len(), "Loaded source catalog");
            Ok(catalog)
        }
        None => Ok(SourceCatalog::builtin()),
    }
}

/// Connect to PostgreSQL using DATABASE_URL and apply migrations.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env()?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await?;
    Ok(db)
}

/// The keys to run, in the order given; `--all` means catalog order.
fn resolve_keys(catalog: &SourceCatalog, requested: Vec<String>, all: bool) -> Result<Vec<String>> {
    if all {
        return Ok(catalog.keys().map(str::to_string).collect());
    }
    let unknown: Vec<&str> = requested
        .iter()
        .map(String::as_str)
        .filter(|k| catalog.get(k).is_none())
        .collect();
    if !unknown.is_empty() {
        bail!(
            "Unknown source(s): {}. Run `herald sources` to list them.",
            unknown.join(", ")
        );
    }
    Ok(requested)
}

/// One source's output in the printed JSON.
#[derive(Serialize)]
struct SourceOutput {
    source: String,
    articles: Vec<HeadlinedArticle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SourceOutput {
    fn from_run(source: String, result: Result<IngestReport, AppError>) -> Self {
        match result {
            Ok(report) => Self {
                source,
                articles: report.articles,
                error: None,
            },
            Err(e) => Self {
                articles: vec![HeadlinedArticle::placeholder(&source)],
                source,
                error: Some(e.to_string()),
            },
        }
    }
}

async fn cmd_ingest<S: ArticleStore>(
    pipeline: &Pipeline<S>,
    keys: &[String],
    full_report: bool,
) -> Result<()> {
    let runs = pipeline.run_all(keys.iter().map(String::as_str)).await;

    let failed = runs.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        tracing::warn!(failed, total = runs.len(), "Some sources were unavailable");
    }

    if full_report {
        let reports: Vec<serde_json::Value> = runs
            .into_iter()
            .map(|(source, result)| match result {
                Ok(report) => serde_json::to_value(report),
                Err(e) => Ok(serde_json::json!({
                    "source_key": source,
                    "error": e.to_string(),
                })),
            })
            .collect::<Result<_, _>>()?;
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        let outputs: Vec<SourceOutput> = runs
            .into_iter()
            .map(|(source, result)| SourceOutput::from_run(source, result))
            .collect();
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    }

    Ok(())
}

fn cmd_sources(catalog: &SourceCatalog) {
    if catalog.is_empty() {
        println!("No sources configured");
        return;
    }

    for (key, spec) in catalog.iter() {
        println!("  {key:<36} {:<10} {}", spec.kind(), describe(spec));
    }
    println!("\nTotal: {} sources", catalog.len());
}

fn describe(spec: &SourceSpec) -> String {
    match spec {
        SourceSpec::Aggregator { subreddit } => format!("r/{subreddit}"),
        SourceSpec::Feed { url } => url.clone(),
        SourceSpec::Search {
            country,
            category,
            query,
        } => {
            let filters: Vec<String> = [("country", country), ("category", category), ("q", query)]
                .into_iter()
                .filter_map(|(name, value)| value.as_ref().map(|v| format!("{name}={v}")))
                .collect();
            if filters.is_empty() {
                "top headlines".to_string()
            } else {
                filters.join(" ")
            }
        }
    }
}

async fn cmd_articles(db: &Database, category: Option<&str>, limit: usize) -> Result<()> {
    let articles = db.article_repo().list_recent(category, limit).await?;

    if articles.is_empty() {
        match category {
            Some(category) => println!("No articles stored for {category}"),
            None => println!("No articles stored yet"),
        }
        return Ok(());
    }

    for article in &articles {
        println!(
            "  {} [{}] {}",
            article.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            article.category.as_deref().unwrap_or("-"),
            article.stored_headline().unwrap_or(&article.title),
        );
        println!("      {}", article.url);
    }

    println!("\nTotal: {} articles", articles.len());

    Ok(())
}
