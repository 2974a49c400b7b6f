use chrono::{DateTime, Utc};
use herald_core::error::AppError;
use herald_core::models::{Article, Candidate};
use herald_core::traits::ArticleStore;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

const ARTICLE_COLUMNS: &str = "id, url, title, body, headline, category, created_at, updated_at";

/// Article persistence in PostgreSQL. `url` carries a unique constraint.
#[derive(Clone)]
pub struct ArticleRepository {
    pool: Pool<Postgres>,
}

impl ArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Exact-match lookup by URL.
    pub async fn find_by_url(&self, url: &str) -> Result<Option<Article>, AppError> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE url = $1"
        ))
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    /// Insert a new article with its headline.
    ///
    /// A concurrent insert of the same URL surfaces as
    /// [`AppError::DuplicateKey`].
    pub async fn create(&self, candidate: &Candidate, headline: &str) -> Result<Article, AppError> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            r#"
            INSERT INTO articles (url, title, body, headline, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ARTICLE_COLUMNS}
            "#
        ))
        .bind(&candidate.url)
        .bind(&candidate.title)
        .bind(&candidate.body)
        .bind(headline)
        .bind(&candidate.category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                tracing::debug!(url = %candidate.url, "Insert lost race on unique url");
                AppError::DuplicateKey(candidate.url.clone())
            } else {
                AppError::DatabaseError(e.to_string())
            }
        })?;

        Ok(row.into())
    }

    /// Fill in the headline of an existing, headline-less article.
    ///
    /// A row that already carries a non-blank headline is left untouched and
    /// the call succeeds; an unknown id is a [`AppError::DatabaseError`].
    pub async fn update_headline(&self, id: Uuid, headline: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE articles
            SET headline = $2, updated_at = NOW()
            WHERE id = $1 AND (headline IS NULL OR btrim(headline) = '')
            "#,
        )
        .bind(id)
        .bind(headline)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM articles WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if !exists {
            return Err(AppError::DatabaseError(format!("Article {id} not found")));
        }
        tracing::debug!(%id, "Article already has a headline, keeping it");
        Ok(())
    }

    /// Most recent articles, newest first, optionally filtered by category.
    pub async fn list_recent(
        &self,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Article>, AppError> {
        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            r#"
            SELECT {ARTICLE_COLUMNS}
            FROM articles
            WHERE ($1::TEXT IS NULL OR category = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(category)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: Uuid,
    url: String,
    title: String,
    body: String,
    headline: Option<String>,
    category: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: row.id,
            url: row.url,
            title: row.title,
            body: row.body,
            headline: row.headline,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// -- Trait implementation --

impl ArticleStore for ArticleRepository {
    async fn find_by_url(&self, url: &str) -> Result<Option<Article>, AppError> {
        ArticleRepository::find_by_url(self, url).await
    }

    async fn create(&self, candidate: &Candidate, headline: &str) -> Result<Article, AppError> {
        ArticleRepository::create(self, candidate, headline).await
    }

    async fn update_headline(&self, article: &Article, headline: &str) -> Result<(), AppError> {
        ArticleRepository::update_headline(self, article.id, headline).await
    }
}
