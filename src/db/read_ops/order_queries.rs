use crate::db::mappers::{clamp_limit, parse_order};
use crate::db::BoodaiDb;
use crate::error::{ApiError, Result};
use crate::types::Order;

use super::types::OrderRow;

pub const DEFAULT_ORDER_PAGE: i64 = 50;
pub const MAX_ORDER_PAGE: i64 = 200;

const ORDER_SELECT: &str = "SELECT id, branch_id, customer_name, phone, address, comment,
            delivery_type, payment_method, items, subtotal, discount_amount, total,
            promo_code, status, created_at
     FROM orders";

impl BoodaiDb {
    /// Newest first.
    pub async fn list_orders(&self, branch_id: Option<i32>, limit: Option<i64>) -> Result<Vec<Order>> {
        sqlx::query_as::<_, OrderRow>(&format!(
            "{ORDER_SELECT}
             WHERE ($1::INTEGER IS NULL OR branch_id = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        ))
        .bind(branch_id)
        .bind(clamp_limit(limit, DEFAULT_ORDER_PAGE, MAX_ORDER_PAGE))
        .fetch_all(self.pool())
        .await
        .map_err(|e| ApiError::DatabaseError(format!("Failed to list orders: {e}")))?
        .into_iter()
        .map(parse_order)
        .collect()
    }

    pub async fn get_order(&self, id: i64) -> Result<Option<Order>> {
        sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| ApiError::DatabaseError(format!("Failed to get order: {e}")))?
            .map(parse_order)
            .transpose()
    }
}
