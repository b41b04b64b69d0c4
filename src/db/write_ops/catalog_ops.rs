#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use tracing::info;

use super::types::NewDiscount;
use crate::db::BoodaiDb;
use crate::error::{ApiError, Result};
use crate::types::{Branch, Category, Discount, Subcategory};

const BRANCH_COLUMNS: &str = "id, name, address, phone, telegram_chat_id, created_at";

impl BoodaiDb {
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert_branch(
        &self,
        name: &str,
        address: Option<&str>,
        phone: Option<&str>,
        telegram_chat_id: Option<&str>,
    ) -> Result<Branch> {
        let branch = sqlx::query_as::<_, Branch>(&format!(
            "INSERT INTO branches (name, address, phone, telegram_chat_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {BRANCH_COLUMNS}"
        ))
        .bind(name)
        .bind(address)
        .bind(phone)
        .bind(telegram_chat_id)
        .fetch_one(self.pool())
        .await
        .map_err(ApiError::from)?;

        info!(branch_id = branch.id, "Created branch {}", branch.name);
        Ok(branch)
    }

    /// Returns `None` when no branch has this id.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn update_branch(
        &self,
        id: i32,
        name: &str,
        address: Option<&str>,
        phone: Option<&str>,
        telegram_chat_id: Option<&str>,
    ) -> Result<Option<Branch>> {
        sqlx::query_as::<_, Branch>(&format!(
            "UPDATE branches
             SET name = $2, address = $3, phone = $4, telegram_chat_id = $5
             WHERE id = $1
             RETURNING {BRANCH_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(address)
        .bind(phone)
        .bind(telegram_chat_id)
        .fetch_optional(self.pool())
        .await
        .map_err(ApiError::from)
    }

    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn delete_branch(&self, id: i32) -> Result<bool> {
        delete_by_id(self, "branches", id).await
    }

    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert_category(&self, name: &str) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(self.pool())
        .await
        .map_err(ApiError::from)
    }

    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn update_category(&self, id: i32, name: &str) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(self.pool())
        .await
        .map_err(ApiError::from)
    }

    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn delete_category(&self, id: i32) -> Result<bool> {
        delete_by_id(self, "categories", id).await
    }

    /// Inserts and returns the row joined with its category name.
    ///
    /// # Errors
    /// Returns an error if the database operation fails or the category does not exist.
    pub async fn insert_subcategory(&self, name: &str, category_id: i32) -> Result<Subcategory> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO subcategories (name, category_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(category_id)
        .fetch_one(self.pool())
        .await
        .map_err(ApiError::from)?;

        self.get_subcategory(id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("Subcategory {id} vanished after insert")))
    }

    /// # Errors
    /// Returns an error if the database operation fails or the category does not exist.
    pub async fn update_subcategory(
        &self,
        id: i32,
        name: &str,
        category_id: i32,
    ) -> Result<Option<Subcategory>> {
        let updated = sqlx::query("UPDATE subcategories SET name = $2, category_id = $3 WHERE id = $1")
            .bind(id)
            .bind(name)
            .bind(category_id)
            .execute(self.pool())
            .await
            .map_err(ApiError::from)?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_subcategory(id).await
    }

    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn delete_subcategory(&self, id: i32) -> Result<bool> {
        delete_by_id(self, "subcategories", id).await
    }

    /// # Errors
    /// Returns an error if the database operation fails or the product does not exist.
    pub async fn insert_discount(&self, discount: &NewDiscount) -> Result<Discount> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO discounts (product_id, discount_percent, expires_at, is_active)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(discount.product_id)
        .bind(discount.discount_percent)
        .bind(discount.expires_at)
        .bind(discount.is_active)
        .fetch_one(self.pool())
        .await
        .map_err(ApiError::from)?;

        self.get_discount(id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("Discount {id} vanished after insert")))
    }

    /// # Errors
    /// Returns an error if the database operation fails or the product does not exist.
    pub async fn update_discount(&self, id: i32, discount: &NewDiscount) -> Result<Option<Discount>> {
        let updated = sqlx::query(
            "UPDATE discounts
             SET product_id = $2, discount_percent = $3, expires_at = $4, is_active = $5
             WHERE id = $1",
        )
        .bind(id)
        .bind(discount.product_id)
        .bind(discount.discount_percent)
        .bind(discount.expires_at)
        .bind(discount.is_active)
        .execute(self.pool())
        .await
        .map_err(ApiError::from)?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_discount(id).await
    }

    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn delete_discount(&self, id: i32) -> Result<bool> {
        delete_by_id(self, "discounts", id).await
    }
}

/// `table` is always a literal from this module, never caller input.
pub(super) async fn delete_by_id(db: &BoodaiDb, table: &'static str, id: i32) -> Result<bool> {
    sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
        .bind(id)
        .execute(db.pool())
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(ApiError::from)
}
