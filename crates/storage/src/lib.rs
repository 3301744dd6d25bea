//! Persistence layer for athletes and their performance metrics: models,
//! request/response DTOs, the listing query contract and the repositories.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod dto;
pub mod error;
pub mod models;
pub mod repository;

pub use error::{Result, StorageError};
pub use repository::{
    AthleteRepository, InMemoryRepository, MetricRepository, PgAthleteRepository,
    PgMetricRepository,
};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Handle on the PostgreSQL pool. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        Self::with_max_connections(database_url, DEFAULT_MAX_CONNECTIONS).await
    }

    pub async fn with_max_connections(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn athletes(&self) -> PgAthleteRepository {
        PgAthleteRepository::new(self.pool.clone())
    }

    pub fn metrics(&self) -> PgMetricRepository {
        PgMetricRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections to be returned, then closes the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
