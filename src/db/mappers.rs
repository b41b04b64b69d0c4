use crate::db::read_ops::types::OrderRow;
use crate::error::{ApiError, Result};
use crate::types::{DeliveryType, Order, OrderStatus};

pub fn parse_order(row: OrderRow) -> Result<Order> {
    let status = OrderStatus::try_from(row.status.as_str()).map_err(ApiError::DatabaseError)?;
    let delivery_type =
        DeliveryType::try_from(row.delivery_type.as_str()).map_err(ApiError::DatabaseError)?;

    Ok(Order {
        id: row.id,
        branch_id: row.branch_id,
        customer_name: row.customer_name,
        phone: row.phone,
        address: row.address,
        comment: row.comment,
        delivery_type,
        payment_method: row.payment_method,
        items: row.items.0,
        subtotal: row.subtotal,
        discount_amount: row.discount_amount,
        total: row.total,
        promo_code: row.promo_code,
        status,
        created_at: row.created_at,
    })
}

/// Clamps a caller-supplied page size into `1..=max`.
pub const fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    match limit {
        Some(value) if value < 1 => 1,
        Some(value) if value > max => max,
        Some(value) => value,
        None => default,
    }
}
