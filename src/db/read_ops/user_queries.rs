use crate::db::BoodaiDb;
use crate::error::{ApiError, Result};
use crate::types::{normalize_email, UserRecord};

impl BoodaiDb {
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, password, is_admin, created_at
             FROM users
             WHERE LOWER(email) = $1",
        )
        .bind(normalize_email(email))
        .fetch_optional(self.pool())
        .await
        .map_err(|e| ApiError::DatabaseError(format!("Failed to find user: {e}")))
    }
}
