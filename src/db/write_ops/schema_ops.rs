#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use tracing::info;

use crate::db::BoodaiDb;
use crate::error::{ApiError, Result};

pub const SCHEMA_SQL: &str = include_str!("../schema.sql");

impl BoodaiDb {
    /// Applies the embedded schema. Safe to run on every start.
    ///
    /// # Errors
    /// Returns an error if any statement fails.
    pub async fn initialize_schema(&self) -> Result<()> {
        self.initialize_schema_from_sql(SCHEMA_SQL).await?;
        info!("Database schema is up to date");
        Ok(())
    }

    /// # Errors
    /// Returns an error if any statement fails.
    pub async fn initialize_schema_from_sql(&self, schema_sql: &str) -> Result<()> {
        sqlx::raw_sql(schema_sql)
            .execute(self.pool())
            .await
            .map(|_result| ())
            .map_err(|e| ApiError::DatabaseError(format!("Failed to initialize schema: {e}")))
    }
}
