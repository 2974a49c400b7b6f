use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use herald_core::SourceCatalog;
use herald_db::{Database, DatabaseConfig};
use herald_server::routes;
use herald_server::state::{AppState, PipelineSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("herald=info".parse()?))
        .with_target(false)
        .init();

    let port = std::env::var("HERALD_SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");

    let catalog = Arc::new(match std::env::var("HERALD_SOURCES") {
        Ok(path) if !path.trim().is_empty() => SourceCatalog::from_file(Path::new(&path))?,
        _ => SourceCatalog::builtin(),
    });

    let db = Database::connect(&DatabaseConfig::from_env()?).await?;
    db.migrate().await?;

    let ingest = match PipelineSettings::from_env()? {
        Some(settings) => Some(settings.build(catalog.clone(), db.article_repo())?),
        None => {
            tracing::warn!("OPENAI_API_KEY not set, headline ingestion disabled");
            None
        }
    };

    let state = Arc::new(AppState {
        db,
        catalog,
        ingest,
    });

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for CTRL+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
