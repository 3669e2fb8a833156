//! PostgreSQL adapters backed by sqlx.

mod documents;
mod profiles;

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::error::{MarketError, Result};

pub use documents::PostgresDocumentRepository;
pub use profiles::PostgresProfileRepository;

/// Shared connection pool plus schema management.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(url)
            .await
            .map_err(|e| MarketError::Database(format!("Database connection failed: {e}")))?;
        info!(max_connections, "database pool initialized");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        crate::MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| MarketError::Database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    pub fn documents(&self) -> PostgresDocumentRepository {
        PostgresDocumentRepository::new(self.pool.clone())
    }

    pub fn profiles(&self) -> PostgresProfileRepository {
        PostgresProfileRepository::new(self.pool.clone())
    }
}
