#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::db::BoodaiDb;
use crate::error::{ApiError, Result};
use crate::types::Story;

impl BoodaiDb {
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert_story(&self, image: &str) -> Result<Story> {
        sqlx::query_as::<_, Story>(
            "INSERT INTO stories (image) VALUES ($1) RETURNING id, image, created_at",
        )
        .bind(image)
        .fetch_one(self.pool())
        .await
        .map_err(ApiError::from)
    }

    /// Swaps the image and hands back the previous key so the caller can delete it.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn update_story_image(&self, id: i32, image: &str) -> Result<Option<(Story, String)>> {
        let mut tx = self.begin().await?;

        let previous = sqlx::query_scalar::<_, String>(
            "SELECT image FROM stories WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(ApiError::from)?;

        let Some(previous) = previous else {
            return Ok(None);
        };

        let story = sqlx::query_as::<_, Story>(
            "UPDATE stories SET image = $2 WHERE id = $1 RETURNING id, image, created_at",
        )
        .bind(id)
        .bind(image)
        .fetch_one(&mut *tx)
        .await
        .map_err(ApiError::from)?;

        tx.commit()
            .await
            .map_err(|e| ApiError::DatabaseError(format!("Failed to commit story update: {e}")))?;

        Ok(Some((story, previous)))
    }

    /// Returns the image key of the deleted story.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn delete_story(&self, id: i32) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>("DELETE FROM stories WHERE id = $1 RETURNING image")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(ApiError::from)
    }
}
