//! Cart pricing.
//!
//! Prices always come from the product rows, never from the client. Each line
//! gets its product discount, then the promo code percent is taken off the
//! discounted subtotal. Amounts are rounded to two decimals at every step so
//! the stored order, the receipt and the chat message agree.

use std::collections::HashMap;

use crate::error::{ApiError, Result};
use crate::types::{CartItem, OrderQuote, PricedLine, Product, PromoCode};

pub const MAX_LINE_QUANTITY: u32 = 100;

#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn apply_percent(amount: f64, percent: i32) -> f64 {
    amount * f64::from(100 - percent.clamp(0, 100)) / 100.0
}

/// # Errors
/// Returns `BadRequest` for an empty cart, a quantity outside
/// `1..=MAX_LINE_QUANTITY`, an unknown product, or a product with no price.
pub fn quote_order(
    items: &[CartItem],
    products: &HashMap<i32, Product>,
    promo: Option<&PromoCode>,
) -> Result<OrderQuote> {
    if items.is_empty() {
        return Err(ApiError::bad_request("Cart is empty"));
    }

    let lines = items
        .iter()
        .map(|item| price_line(item, products))
        .collect::<Result<Vec<_>>>()?;

    let gross = round2(
        lines
            .iter()
            .map(|line| line.unit_price * f64::from(line.quantity))
            .sum(),
    );
    let subtotal = round2(lines.iter().map(|line| line.line_total).sum());
    let promo_percent = promo.map_or(0, |p| p.discount_percent.clamp(0, 100));
    let total = round2(apply_percent(subtotal, promo_percent));

    Ok(OrderQuote {
        lines,
        gross,
        subtotal,
        promo_code: promo.map(|p| p.code.clone()),
        promo_percent,
        discount_amount: round2(gross - total),
        total,
    })
}

fn price_line(item: &CartItem, products: &HashMap<i32, Product>) -> Result<PricedLine> {
    if item.quantity == 0 || item.quantity > MAX_LINE_QUANTITY {
        return Err(ApiError::bad_request(format!(
            "Quantity for product {} must be between 1 and {MAX_LINE_QUANTITY}",
            item.product_id
        )));
    }

    let product = products
        .get(&item.product_id)
        .ok_or_else(|| ApiError::bad_request(format!("Product {} not found", item.product_id)))?;

    let size = item.size.filter(|s| product.sized_price(*s).is_some());
    let unit_price = product.price_for(size).ok_or_else(|| {
        ApiError::bad_request(format!("Product '{}' has no price", product.name))
    })?;

    let discount_percent = product.discount_percent.unwrap_or(0).clamp(0, 100);
    let line_total = round2(apply_percent(
        unit_price * f64::from(item.quantity),
        discount_percent,
    ));

    Ok(PricedLine {
        product_id: product.id,
        name: product.name.clone(),
        size,
        quantity: item.quantity,
        unit_price,
        discount_percent,
        line_total,
    })
}
