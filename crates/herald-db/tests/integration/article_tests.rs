use herald_core::AppError;
use herald_core::models::Candidate;
use herald_core::traits::ArticleStore;
use herald_db::ArticleRepository;

use crate::integration::common::setup_test_db;

fn candidate(url: &str, category: &str) -> Candidate {
    Candidate {
        title: "Original title".into(),
        url: url.into(),
        body: "Body text ".repeat(120),
        category: Some(category.into()),
    }
}

#[tokio::test]
async fn create_and_find_by_url() {
    let (pool, _container) = setup_test_db().await;
    let repo = ArticleRepository::new(pool);

    let created = repo
        .create(&candidate("https://news.test/a", "bbc_world"), "Short headline")
        .await
        .unwrap();
    assert!(!created.id.is_nil());
    assert_eq!(created.headline.as_deref(), Some("Short headline"));

    let found = repo
        .find_by_url("https://news.test/a")
        .await
        .unwrap()
        .expect("Should find the article");
    assert_eq!(found.id, created.id);
    assert_eq!(found.title, "Original title");
    assert_eq!(found.category.as_deref(), Some("bbc_world"));
    assert_eq!(found.body, created.body);
}

#[tokio::test]
async fn find_by_url_is_exact_match() {
    let (pool, _container) = setup_test_db().await;
    let repo = ArticleRepository::new(pool);

    repo.create(&candidate("https://news.test/a", "k"), "H")
        .await
        .unwrap();

    assert!(repo.find_by_url("https://news.test/a/").await.unwrap().is_none());
    assert!(repo.find_by_url("https://NEWS.test/a").await.unwrap().is_none());
    assert!(repo.find_by_url("").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_url_is_duplicate_key() {
    let (pool, _container) = setup_test_db().await;
    let repo = ArticleRepository::new(pool);

    repo.create(&candidate("https://news.test/dup", "k"), "First")
        .await
        .unwrap();
    let err = repo
        .create(&candidate("https://news.test/dup", "k"), "Second")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateKey(ref url) if url == "https://news.test/dup"));

    let stored = repo.find_by_url("https://news.test/dup").await.unwrap().unwrap();
    assert_eq!(stored.headline.as_deref(), Some("First"));
}

#[tokio::test]
async fn update_headline_fills_missing_headline() {
    let (pool, _container) = setup_test_db().await;

    sqlx::query("INSERT INTO articles (url, title, body) VALUES ($1, $2, $3)")
        .bind("https://news.test/bare")
        .bind("Bare")
        .bind("Stored body")
        .execute(&pool)
        .await
        .unwrap();

    let repo = ArticleRepository::new(pool);
    let article = repo
        .find_by_url("https://news.test/bare")
        .await
        .unwrap()
        .unwrap();
    assert!(article.stored_headline().is_none());

    ArticleStore::update_headline(&repo, &article, "Filled in")
        .await
        .unwrap();

    let updated = repo
        .find_by_url("https://news.test/bare")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.headline.as_deref(), Some("Filled in"));
    assert_eq!(updated.body, "Stored body");
    assert!(updated.updated_at >= article.updated_at);
}

#[tokio::test]
async fn update_headline_keeps_existing_headline() {
    let (pool, _container) = setup_test_db().await;
    let repo = ArticleRepository::new(pool);

    let article = repo
        .create(&candidate("https://news.test/enriched", "k"), "Already set")
        .await
        .unwrap();

    ArticleStore::update_headline(&repo, &article, "Late writer")
        .await
        .unwrap();

    let stored = repo
        .find_by_url("https://news.test/enriched")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.headline.as_deref(), Some("Already set"));
    assert_eq!(stored.updated_at, article.updated_at);
}

#[tokio::test]
async fn update_headline_replaces_blank_headline() {
    let (pool, _container) = setup_test_db().await;

    sqlx::query("INSERT INTO articles (url, title, body, headline) VALUES ($1, $2, $3, $4)")
        .bind("https://news.test/blank")
        .bind("Blank")
        .bind("Stored body")
        .bind("   ")
        .execute(&pool)
        .await
        .unwrap();

    let repo = ArticleRepository::new(pool);
    let article = repo
        .find_by_url("https://news.test/blank")
        .await
        .unwrap()
        .unwrap();
    repo.update_headline(article.id, "Now filled").await.unwrap();

    let stored = repo
        .find_by_url("https://news.test/blank")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.headline.as_deref(), Some("Now filled"));
}

#[tokio::test]
async fn update_headline_of_missing_row_fails() {
    let (pool, _container) = setup_test_db().await;
    let repo = ArticleRepository::new(pool);

    let err = repo
        .update_headline(uuid::Uuid::new_v4(), "Nobody")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DatabaseError(_)));
}

#[tokio::test]
async fn list_recent_filters_and_orders() {
    let (pool, _container) = setup_test_db().await;
    let repo = ArticleRepository::new(pool);

    for (i, category) in ["bbc_world", "world_news", "bbc_world"].iter().enumerate() {
        repo.create(
            &candidate(&format!("https://news.test/{i}"), category),
            &format!("Headline {i}"),
        )
        .await
        .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let all = repo.list_recent(None, 10).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].url, "https://news.test/2");

    let bbc = repo.list_recent(Some("bbc_world"), 10).await.unwrap();
    let urls: Vec<_> = bbc.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(urls, ["https://news.test/2", "https://news.test/0"]);

    let limited = repo.list_recent(None, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn health_check_succeeds() {
    let (pool, _container) = setup_test_db().await;
    ArticleRepository::new(pool).health_check().await.unwrap();
}
