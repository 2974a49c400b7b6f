use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use herald_core::AppError;
use herald_core::models::HeadlinedArticle;

use crate::dto::{
    ArticleListQuery, ArticleListResponse, ArticleResponse, HeadlineResponse, HeadlinesResponse,
    HealthResponse, SourceListResponse, SourceResponse,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

const DEFAULT_ARTICLE_LIMIT: usize = 20;
const MAX_ARTICLE_LIMIT: usize = 100;

/// Build the full router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/sources", get(list_sources))
        .route("/v1/headlines/{source}", get(get_headlines))
        .route("/v1/articles", get(list_articles))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/v1/sources",
    responses(
        (status = 200, description = "Configured sources", body = SourceListResponse),
    ),
    tag = "sources"
)]
pub async fn list_sources(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sources: Vec<SourceResponse> = state
        .catalog
        .iter()
        .map(|(key, spec)| SourceResponse::new(key, spec))
        .collect();
    let total = sources.len();

    axum::Json(SourceListResponse { sources, total })
}

// ---------------------------------------------------------------------------
// Headlines
// ---------------------------------------------------------------------------

/// Run the pipeline for one source and return its headlined articles.
///
/// When the source is unavailable or yields nothing displayable, the response
/// carries a single placeholder article and `degraded: true`.
#[utoipa::path(
    get,
    path = "/v1/headlines/{source}",
    params(("source" = String, Path, description = "Source key")),
    responses(
        (status = 200, description = "Headlined articles, or a placeholder", body = HeadlinesResponse),
        (status = 404, description = "Unknown source", body = crate::dto::ErrorResponse),
        (status = 503, description = "Ingestion not configured", body = crate::dto::ErrorResponse),
    ),
    tag = "headlines"
)]
pub async fn get_headlines(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.catalog.resolve(&source)?;

    let ingest = state.ingest.as_ref().ok_or_else(|| {
        AppError::ConfigError("OPENAI_API_KEY must be set for headline ingestion".to_string())
    })?;

    let response = match ingest.run(&source).await {
        Ok(report) if !report.articles.is_empty() => HeadlinesResponse {
            source,
            degraded: false,
            articles: report.articles.into_iter().map(HeadlineResponse::from).collect(),
            stats: Some(report.stats.into()),
            error: None,
        },
        Ok(report) => HeadlinesResponse {
            articles: vec![HeadlinedArticle::placeholder(&source).into()],
            source,
            degraded: true,
            stats: Some(report.stats.into()),
            error: None,
        },
        Err(e) => {
            tracing::warn!(%source, error = %e, "Serving placeholder headlines");
            HeadlinesResponse {
                articles: vec![HeadlinedArticle::placeholder(&source).into()],
                source,
                degraded: true,
                stats: None,
                error: Some(e.to_string()),
            }
        }
    };

    Ok(axum::Json(response))
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/v1/articles",
    params(ArticleListQuery),
    responses(
        (status = 200, description = "Recently stored articles, newest first", body = ArticleListResponse),
    ),
    tag = "articles"
)]
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ArticleListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_ARTICLE_LIMIT)
        .min(MAX_ARTICLE_LIMIT);
    let articles = state
        .db
        .article_repo()
        .list_recent(query.category.as_deref(), limit)
        .await?;
    let total = articles.len();

    let response = ArticleListResponse {
        articles: articles.into_iter().map(ArticleResponse::from).collect(),
        total,
    };

    Ok(axum::Json(response))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_status = match state.db.article_repo().health_check().await {
        Ok(()) => "ok",
        Err(_) => "error",
    };

    let status = if db_status == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if db_status == "ok" {
            "healthy"
        } else {
            "unhealthy"
        },
        database: db_status,
        ingest: state.ingest.is_some(),
    };

    (status, axum::Json(response))
}
