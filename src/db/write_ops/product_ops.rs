#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use tracing::info;

use crate::db::BoodaiDb;
use crate::error::{ApiError, Result};
use crate::types::ProductInput;

impl BoodaiDb {
    /// # Errors
    /// Returns an error if the database operation fails or a referenced row is missing.
    pub async fn insert_product(&self, input: &ProductInput, image: &str) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO products (
                 name, description, price_small, price_medium, price_large, price_single,
                 branch_id, category_id, sub_category_id, is_pizza, mini_recipe, image
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING id",
        )
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.price_small)
        .bind(input.price_medium)
        .bind(input.price_large)
        .bind(input.price_single)
        .bind(input.branch_id)
        .bind(input.category_id)
        .bind(input.sub_category_id)
        .bind(input.is_pizza)
        .bind(input.mini_recipe.as_deref())
        .bind(image)
        .fetch_one(self.pool())
        .await
        .map_err(ApiError::from)?;

        info!(product_id = id, "Created product {}", input.name);
        Ok(id)
    }

    /// Rewrites every column. Returns `false` when no product has this id.
    ///
    /// # Errors
    /// Returns an error if the database operation fails or a referenced row is missing.
    pub async fn update_product(&self, id: i32, input: &ProductInput, image: &str) -> Result<bool> {
        sqlx::query(
            "UPDATE products
             SET name = $2, description = $3,
                 price_small = $4, price_medium = $5, price_large = $6, price_single = $7,
                 branch_id = $8, category_id = $9, sub_category_id = $10,
                 is_pizza = $11, mini_recipe = $12, image = $13
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.price_small)
        .bind(input.price_medium)
        .bind(input.price_large)
        .bind(input.price_single)
        .bind(input.branch_id)
        .bind(input.category_id)
        .bind(input.sub_category_id)
        .bind(input.is_pizza)
        .bind(input.mini_recipe.as_deref())
        .bind(image)
        .execute(self.pool())
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(ApiError::from)
    }

    /// Returns the image key of the deleted product, if there was one.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn delete_product(&self, id: i32) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>("DELETE FROM products WHERE id = $1 RETURNING image")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(ApiError::from)
    }
}
