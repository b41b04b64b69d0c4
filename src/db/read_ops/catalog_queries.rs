use std::collections::HashMap;

use crate::db::BoodaiDb;
use crate::error::{ApiError, Result};
use crate::types::{Branch, Category, Discount, Product, PromoCode, Story, Subcategory};

/// Product columns plus joined names and the best active discount.
pub(crate) const PRODUCT_SELECT: &str = "SELECT
        p.id, p.name, p.description,
        p.price_small, p.price_medium, p.price_large, p.price_single,
        p.branch_id, p.category_id, p.sub_category_id, p.is_pizza, p.mini_recipe,
        p.image, p.created_at,
        b.name AS branch_name,
        c.name AS category_name,
        s.name AS subcategory_name,
        d.discount_percent
     FROM products p
     LEFT JOIN branches b ON p.branch_id = b.id
     LEFT JOIN categories c ON p.category_id = c.id
     LEFT JOIN subcategories s ON p.sub_category_id = s.id
     LEFT JOIN LATERAL (
         SELECT discount_percent
         FROM discounts
         WHERE product_id = p.id
           AND is_active
           AND (expires_at IS NULL OR expires_at > NOW())
         ORDER BY discount_percent DESC
         LIMIT 1
     ) d ON TRUE";

pub(crate) const SUBCATEGORY_SELECT: &str = "SELECT s.id, s.name, s.category_id, c.name AS category_name
     FROM subcategories s
     JOIN categories c ON s.category_id = c.id";

pub(crate) const DISCOUNT_SELECT: &str = "SELECT d.id, d.product_id, d.discount_percent, d.expires_at,
            d.is_active, d.created_at, p.name AS product_name
     FROM discounts d
     JOIN products p ON d.product_id = p.id";

impl BoodaiDb {
    pub async fn list_branches(&self) -> Result<Vec<Branch>> {
        sqlx::query_as::<_, Branch>(
            "SELECT id, name, address, phone, telegram_chat_id, created_at
             FROM branches
             ORDER BY id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| ApiError::DatabaseError(format!("Failed to list branches: {e}")))
    }

    pub async fn get_branch(&self, id: i32) -> Result<Option<Branch>> {
        sqlx::query_as::<_, Branch>(
            "SELECT id, name, address, phone, telegram_chat_id, created_at
             FROM branches
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| ApiError::DatabaseError(format!("Failed to get branch: {e}")))
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>("SELECT id, name, created_at FROM categories ORDER BY id")
            .fetch_all(self.pool())
            .await
            .map_err(|e| ApiError::DatabaseError(format!("Failed to list categories: {e}")))
    }

    pub async fn list_subcategories(&self) -> Result<Vec<Subcategory>> {
        sqlx::query_as::<_, Subcategory>(&format!("{SUBCATEGORY_SELECT} ORDER BY s.id"))
            .fetch_all(self.pool())
            .await
            .map_err(|e| ApiError::DatabaseError(format!("Failed to list subcategories: {e}")))
    }

    pub async fn get_subcategory(&self, id: i32) -> Result<Option<Subcategory>> {
        sqlx::query_as::<_, Subcategory>(&format!("{SUBCATEGORY_SELECT} WHERE s.id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| ApiError::DatabaseError(format!("Failed to get subcategory: {e}")))
    }

    pub async fn list_products(
        &self,
        branch_id: Option<i32>,
        category_id: Option<i32>,
    ) -> Result<Vec<Product>> {
        sqlx::query_as::<_, Product>(&format!(
            "{PRODUCT_SELECT}
             WHERE ($1::INTEGER IS NULL OR p.branch_id = $1)
               AND ($2::INTEGER IS NULL OR p.category_id = $2)
             ORDER BY p.id"
        ))
        .bind(branch_id)
        .bind(category_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| ApiError::DatabaseError(format!("Failed to list products: {e}")))
    }

    pub async fn get_product(&self, id: i32) -> Result<Option<Product>> {
        sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| ApiError::DatabaseError(format!("Failed to get product: {e}")))
    }

    /// Products keyed by id, for pricing a cart in one round trip.
    pub async fn products_by_ids(&self, ids: &[i32]) -> Result<HashMap<i32, Product>> {
        sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} WHERE p.id = ANY($1)"))
            .bind(ids)
            .fetch_all(self.pool())
            .await
            .map(|products| products.into_iter().map(|p| (p.id, p)).collect())
            .map_err(|e| ApiError::DatabaseError(format!("Failed to load cart products: {e}")))
    }

    pub async fn get_product_image(&self, id: i32) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT image FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| ApiError::DatabaseError(format!("Failed to get product image: {e}")))
    }

    /// Active, unexpired discounts only.
    pub async fn list_active_discounts(&self) -> Result<Vec<Discount>> {
        sqlx::query_as::<_, Discount>(&format!(
            "{DISCOUNT_SELECT}
             WHERE d.is_active AND (d.expires_at IS NULL OR d.expires_at > NOW())
             ORDER BY d.id"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(|e| ApiError::DatabaseError(format!("Failed to list discounts: {e}")))
    }

    pub async fn get_discount(&self, id: i32) -> Result<Option<Discount>> {
        sqlx::query_as::<_, Discount>(&format!("{DISCOUNT_SELECT} WHERE d.id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| ApiError::DatabaseError(format!("Failed to get discount: {e}")))
    }

    pub async fn list_promo_codes(&self) -> Result<Vec<PromoCode>> {
        sqlx::query_as::<_, PromoCode>(
            "SELECT id, code, discount_percent, expires_at, is_active, created_at
             FROM promo_codes
             ORDER BY id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| ApiError::DatabaseError(format!("Failed to list promo codes: {e}")))
    }

    /// Codes are stored upper-cased, so lookup is case-insensitive.
    pub async fn find_promo_code(&self, code: &str) -> Result<Option<PromoCode>> {
        sqlx::query_as::<_, PromoCode>(
            "SELECT id, code, discount_percent, expires_at, is_active, created_at
             FROM promo_codes
             WHERE code = UPPER(TRIM($1))",
        )
        .bind(code)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| ApiError::DatabaseError(format!("Failed to find promo code: {e}")))
    }

    pub async fn list_stories(&self) -> Result<Vec<Story>> {
        sqlx::query_as::<_, Story>("SELECT id, image, created_at FROM stories ORDER BY id DESC")
            .fetch_all(self.pool())
            .await
            .map_err(|e| ApiError::DatabaseError(format!("Failed to list stories: {e}")))
    }

    pub async fn get_story(&self, id: i32) -> Result<Option<Story>> {
        sqlx::query_as::<_, Story>("SELECT id, image, created_at FROM stories WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| ApiError::DatabaseError(format!("Failed to get story: {e}")))
    }
}
