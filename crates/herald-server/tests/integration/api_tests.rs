use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::integration::common::{OFFLINE_SOURCE, setup_test_app, setup_test_app_no_ingest};

async fn json_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
    assert_eq!(json["ingest"], true);
}

#[tokio::test]
async fn health_reports_disabled_ingest() {
    let app = setup_test_app_no_ingest().await;

    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["ingest"], false);
}

#[tokio::test]
async fn list_sources_returns_catalog() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(Request::get("/v1/sources").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let sources = json["sources"].as_array().unwrap();
    assert_eq!(json["total"].as_u64().unwrap() as usize, sources.len());

    let world = sources
        .iter()
        .find(|s| s["key"] == "world_news")
        .expect("world_news should be listed");
    assert_eq!(world["kind"], "aggregator");
    assert_eq!(world["spec"]["subreddit"], "worldnews");
}

#[tokio::test]
async fn unknown_source_returns_404() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(
            Request::get("/v1/headlines/no_such_source")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "unknown_source");
}

#[tokio::test]
async fn headlines_without_ingest_returns_503() {
    let app = setup_test_app_no_ingest().await;

    let response = app
        .router
        .oneshot(
            Request::get("/v1/headlines/bbc_world")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["error"], "config_error");
}

#[tokio::test]
async fn unavailable_source_serves_placeholder() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(
            Request::get(format!("/v1/headlines/{OFFLINE_SOURCE}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["source"], OFFLINE_SOURCE);
    assert_eq!(json["degraded"], true);
    assert!(json["error"].as_str().unwrap().contains(OFFLINE_SOURCE));

    let articles = json["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 1);
    assert!(!articles[0]["headline"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn list_articles_filters_by_category() {
    let app = setup_test_app().await;

    for (url, category, headline) in [
        ("https://news.test/1", "bbc_world", Some("First headline")),
        ("https://news.test/2", "world_news", Some("Second headline")),
        ("https://news.test/3", "bbc_world", None),
    ] {
        sqlx::query(
            "INSERT INTO articles (url, title, body, headline, category) VALUES ($1, 'T', 'B', $2, $3)",
        )
        .bind(url)
        .bind(headline)
        .bind(category)
        .execute(&app.pool)
        .await
        .unwrap();
    }

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/v1/articles").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["total"], 3);

    let response = app
        .router
        .oneshot(
            Request::get("/v1/articles?category=bbc_world&limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["total"], 2);
    for article in json["articles"].as_array().unwrap() {
        assert_eq!(article["category"], "bbc_world");
    }
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(
            Request::get("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["info"]["title"], "Herald API");
}
