#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use tracing::info;

use super::types::NewUser;
use crate::db::BoodaiDb;
use crate::error::{ApiError, Result};
use crate::types::{normalize_email, UserRecord};

impl BoodaiDb {
    /// # Errors
    /// Returns `Conflict` if the email is taken, or a database error.
    pub async fn insert_user(&self, user: &NewUser) -> Result<UserRecord> {
        sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (name, email, password, is_admin)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, email, password, is_admin, created_at",
        )
        .bind(user.name.trim())
        .bind(normalize_email(&user.email))
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .fetch_one(self.pool())
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("User already exists".to_string()),
            other => other,
        })
    }

    /// Creates the admin account unless one with this email already exists.
    /// Returns `true` when a row was inserted.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn seed_admin(&self, user: &NewUser) -> Result<bool> {
        let inserted = sqlx::query(
            "INSERT INTO users (name, email, password, is_admin)
             SELECT $1, $2, $3, TRUE
             WHERE NOT EXISTS (SELECT 1 FROM users WHERE LOWER(email) = $2)",
        )
        .bind(user.name.trim())
        .bind(normalize_email(&user.email))
        .bind(&user.password_hash)
        .execute(self.pool())
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|e| ApiError::DatabaseError(format!("Failed to seed admin: {e}")))?;

        if inserted {
            info!("Seeded admin account {}", normalize_email(&user.email));
        }
        Ok(inserted)
    }

    /// Number of users with the admin flag.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn count_admins(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_admin")
            .fetch_one(self.pool())
            .await
            .map_err(|e| ApiError::DatabaseError(format!("Failed to count admins: {e}")))
    }
}
