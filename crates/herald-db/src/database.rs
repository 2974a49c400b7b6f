use herald_core::AppError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::DatabaseConfig;
use crate::repository::ArticleRepository;

/// Handle on the Herald PostgreSQL database.
///
/// Cloning is cheap; every clone shares one pool, and the article
/// repository it hands out borrows that same pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open a pool against the configured `DATABASE_URL`, capped at the
    /// configured connection count.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        Ok(Self { pool })
    }

    /// Wrap a pool opened elsewhere, such as one pointed at a test container.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bring the `articles` table up to date from the workspace
    /// `migrations/` directory.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        tracing::debug!("Article schema is current");
        Ok(())
    }

    /// Store used by the ingest pipeline and the read endpoints.
    pub fn article_repo(&self) -> ArticleRepository {
        ArticleRepository::new(self.pool.clone())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
