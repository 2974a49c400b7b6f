use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Herald API",
        version = "0.1.0",
        description = "News headline digest: sources are pulled, deduplicated by URL and given short generated headlines."
    ),
    paths(
        crate::routes::list_sources,
        crate::routes::get_headlines,
        crate::routes::list_articles,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::SourceResponse,
        crate::dto::SourceListResponse,
        crate::dto::HeadlineResponse,
        crate::dto::HeadlinesResponse,
        crate::dto::IngestStatsResponse,
        crate::dto::ArticleResponse,
        crate::dto::ArticleListResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "sources", description = "Configured news sources"),
        (name = "headlines", description = "Ingest a source and return generated headlines"),
        (name = "articles", description = "Stored articles"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
