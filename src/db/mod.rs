mod mappers;
mod read_ops;
mod write_ops;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::error::{ApiError, Result};

pub use write_ops::{
    branch_for_update, insert_order, NewDiscount, NewPromoCode, NewUser, SCHEMA_SQL,
};

#[derive(Clone)]
pub struct BoodaiDb {
    pool: PgPool,
}

impl BoodaiDb {
    /// # Errors
    /// Returns an error if the database connection fails.
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map(|pool| {
                info!("Connected to PostgreSQL storefront database");
                Self { pool }
            })
            .map_err(|e| ApiError::DatabaseError(format!("Failed to connect to database: {e}")))
    }

    /// Pool that connects on first use. Lets routes that never touch the
    /// database run without one.
    ///
    /// # Errors
    /// Returns an error if the URL cannot be parsed.
    pub fn new_lazy(database_url: &str) -> Result<Self> {
        PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy(database_url)
            .map(|pool| Self { pool })
            .map_err(|e| ApiError::ConfigError(format!("Invalid database URL: {e}")))
    }

    #[must_use]
    pub const fn new_with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// # Errors
    /// Returns an error if no connection can be acquired.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| ApiError::DatabaseError(format!("Failed to begin tx: {e}")))
    }

    /// # Errors
    /// Returns an error if the database does not answer.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool())
            .await
            .map(|_| ())
            .map_err(|e| ApiError::DatabaseError(format!("Database ping failed: {e}")))
    }
}
