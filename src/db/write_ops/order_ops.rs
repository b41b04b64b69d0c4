#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use sqlx::types::Json;
use sqlx::PgConnection;

use crate::db::BoodaiDb;
use crate::error::{ApiError, Result};
use crate::types::{Branch, OrderQuote, OrderRequest, OrderStatus};

/// Share-locks the branch row for the rest of the transaction.
///
/// # Errors
/// Returns an error if the database operation fails.
pub async fn branch_for_update(conn: &mut PgConnection, branch_id: i32) -> Result<Option<Branch>> {
    sqlx::query_as::<_, Branch>(
        "SELECT id, name, address, phone, telegram_chat_id, created_at
         FROM branches
         WHERE id = $1
         FOR SHARE",
    )
    .bind(branch_id)
    .fetch_optional(conn)
    .await
    .map_err(|e| ApiError::DatabaseError(format!("Failed to load branch: {e}")))
}

/// Inserts the order on the caller's connection, usually an open transaction.
///
/// # Errors
/// Returns an error if the database operation fails or the branch does not exist.
pub async fn insert_order(
    conn: &mut PgConnection,
    request: &OrderRequest,
    quote: &OrderQuote,
) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (
             branch_id, customer_name, phone, address, comment, delivery_type,
             payment_method, items, subtotal, discount_amount, total, promo_code, status
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
         RETURNING id",
    )
    .bind(request.branch_id)
    .bind(request.customer.name.trim())
    .bind(request.customer.phone.trim())
    .bind(request.customer.address.as_deref())
    .bind(request.customer.comment.as_deref())
    .bind(request.delivery_type.as_str())
    .bind(request.payment_method.as_deref())
    .bind(Json(&quote.lines))
    .bind(quote.subtotal)
    .bind(quote.discount_amount)
    .bind(quote.total)
    .bind(quote.promo_code.as_deref())
    .bind(OrderStatus::New.as_str())
    .fetch_one(conn)
    .await
    .map_err(ApiError::from)
}

impl BoodaiDb {
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<bool> {
        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(self.pool())
            .await
            .map(|result| result.rows_affected() > 0)
            .map_err(|e| ApiError::DatabaseError(format!("Failed to update order status: {e}")))
    }
}
