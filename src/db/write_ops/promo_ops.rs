#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use tracing::info;

use super::catalog_ops::delete_by_id;
use super::types::NewPromoCode;
use crate::db::BoodaiDb;
use crate::error::{ApiError, Result};
use crate::types::PromoCode;

const PROMO_COLUMNS: &str = "id, code, discount_percent, expires_at, is_active, created_at";

/// Codes are matched case-insensitively, so they are stored upper-cased.
fn canonical_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl BoodaiDb {
    /// # Errors
    /// Returns `Conflict` if the code already exists, or a database error.
    pub async fn insert_promo_code(&self, promo: &NewPromoCode) -> Result<PromoCode> {
        let created = sqlx::query_as::<_, PromoCode>(&format!(
            "INSERT INTO promo_codes (code, discount_percent, expires_at, is_active)
             VALUES ($1, $2, $3, $4)
             RETURNING {PROMO_COLUMNS}"
        ))
        .bind(canonical_code(&promo.code))
        .bind(promo.discount_percent)
        .bind(promo.expires_at)
        .bind(promo.is_active)
        .fetch_one(self.pool())
        .await
        .map_err(ApiError::from)?;

        info!(promo_id = created.id, "Created promo code {}", created.code);
        Ok(created)
    }

    /// # Errors
    /// Returns `Conflict` if the new code collides with another one, or a database error.
    pub async fn update_promo_code(&self, id: i32, promo: &NewPromoCode) -> Result<Option<PromoCode>> {
        sqlx::query_as::<_, PromoCode>(&format!(
            "UPDATE promo_codes
             SET code = $2, discount_percent = $3, expires_at = $4, is_active = $5
             WHERE id = $1
             RETURNING {PROMO_COLUMNS}"
        ))
        .bind(id)
        .bind(canonical_code(&promo.code))
        .bind(promo.discount_percent)
        .bind(promo.expires_at)
        .bind(promo.is_active)
        .fetch_optional(self.pool())
        .await
        .map_err(ApiError::from)
    }

    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn delete_promo_code(&self, id: i32) -> Result<bool> {
        delete_by_id(self, "promo_codes", id).await
    }
}

#[cfg(test)]
mod tests {
    use super::canonical_code;

    #[test]
    fn canonical_code_trims_and_uppercases() {
        assert_eq!(canonical_code("  boodai10 "), "BOODAI10");
    }
}
