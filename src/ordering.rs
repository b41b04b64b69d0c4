//! Order submission.
//!
//! The order row and the chat notification succeed or fail together: the
//! insert happens inside a transaction that is committed only after the
//! notifier accepted the message.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use sqlx::PgConnection;
use tracing::{error, info, warn};

use crate::db::{branch_for_update, insert_order, BoodaiDb};
use crate::error::{ApiError, Result};
use crate::notify::format_order_message;
use crate::pricing::quote_order;
use crate::state::AppState;
use crate::types::{
    Branch, DeliveryType, OrderQuote, OrderReceipt, OrderRequest, OrderStatus, PromoCode,
};

/// # Errors
/// Returns `BadRequest` naming the first missing or invalid field.
pub fn validate_request(request: &OrderRequest) -> Result<()> {
    let customer = &request.customer;
    if customer.name.trim().is_empty() {
        return Err(ApiError::bad_request("Customer name is required"));
    }
    if customer.phone.trim().is_empty() {
        return Err(ApiError::bad_request("Customer phone is required"));
    }
    if request.delivery_type == DeliveryType::Delivery
        && customer.address.as_deref().map_or(true, |a| a.trim().is_empty())
    {
        return Err(ApiError::bad_request("Delivery address is required"));
    }
    if request.items.is_empty() {
        return Err(ApiError::bad_request("Cart is empty"));
    }
    Ok(())
}

/// Looks a promo code up and checks it can be applied at `now`.
///
/// # Errors
/// `NotFound` for an unknown code, `BadRequest` for an inactive or expired one.
pub async fn resolve_promo(
    db: &BoodaiDb,
    code: &str,
    now: DateTime<Utc>,
) -> Result<PromoCode> {
    let promo = db
        .find_promo_code(code)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Promo code {} not found", code.trim())))?;

    if !promo.is_usable_at(now) {
        return Err(ApiError::bad_request(format!(
            "Promo code {} is inactive or expired",
            promo.code
        )));
    }
    Ok(promo)
}

/// Chat that should receive the order: the branch's own, else the default.
///
/// # Errors
/// Returns `NotificationError` when neither is configured.
pub fn notification_target(branch: &Branch, default_chat_id: Option<&str>) -> Result<String> {
    branch
        .telegram_chat_id
        .as_deref()
        .map(str::trim)
        .filter(|chat| !chat.is_empty())
        .or_else(|| default_chat_id.map(str::trim).filter(|chat| !chat.is_empty()))
        .map(ToString::to_string)
        .ok_or_else(|| {
            ApiError::NotificationError(format!(
                "Branch {} has no notification chat and no default is configured",
                branch.id
            ))
        })
}

/// Prices the cart from stored product rows and the optional promo code.
///
/// # Errors
/// Returns `BadRequest` for invalid lines or promo codes, `NotFound` for an
/// unknown promo code, or a database error.
pub async fn quote_request(db: &BoodaiDb, request: &OrderRequest) -> Result<OrderQuote> {
    let product_ids = request
        .items
        .iter()
        .map(|item| item.product_id)
        .unique()
        .collect::<Vec<_>>();
    let products = db.products_by_ids(&product_ids).await?;

    let promo = match request
        .promo_code
        .as_deref()
        .filter(|code| !code.trim().is_empty())
    {
        Some(code) => Some(resolve_promo(db, code, Utc::now()).await?),
        None => None,
    };

    quote_order(&request.items, &products, promo.as_ref())
}

/// Validates, prices, persists and announces an order.
///
/// # Errors
/// 4xx errors for invalid input, a database error if persistence fails, or
/// `NotificationError` if the chat could not be notified. Nothing is stored
/// unless the notification went through.
pub async fn submit_order(state: &AppState, request: &OrderRequest) -> Result<OrderReceipt> {
    validate_request(request)?;
    let quote = quote_request(&state.db, request).await?;

    let mut tx = state.db.begin().await?;
    match persist_and_notify(&mut tx, state, request, &quote).await {
        Ok(order_id) => {
            tx.commit()
                .await
                .map_err(|e| ApiError::DatabaseError(format!("Failed to commit order: {e}")))?;
            info!(order_id, total = quote.total, "Order placed");
            Ok(OrderReceipt {
                id: order_id,
                subtotal: quote.subtotal,
                discount_amount: quote.discount_amount,
                total: quote.total,
                status: OrderStatus::New,
            })
        }
        Err(e) => {
            warn!(branch_id = request.branch_id, "Order rejected, rolling back: {e}");
            if let Err(rollback_error) = tx.rollback().await {
                error!("Failed to roll back order transaction: {rollback_error}");
            }
            Err(e)
        }
    }
}

async fn persist_and_notify(
    conn: &mut PgConnection,
    state: &AppState,
    request: &OrderRequest,
    quote: &OrderQuote,
) -> Result<i64> {
    let branch = branch_for_update(&mut *conn, request.branch_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Branch {} not found", request.branch_id)))?;

    let order_id = insert_order(&mut *conn, request, quote).await?;
    let chat_id = notification_target(&branch, state.default_chat_id.as_deref())?;
    let text = format_order_message(order_id, &branch, request, quote);

    state.notifier.send(&chat_id, &text).await?;
    Ok(order_id)
}
