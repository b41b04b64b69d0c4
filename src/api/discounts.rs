use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::extract::{JsonBody, PathParam};
use super::Message;
use crate::db::NewDiscount;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::Discount;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountBody {
    product_id: Option<i32>,
    discount_percent: Option<i32>,
    expires_at: Option<DateTime<Utc>>,
    is_active: Option<bool>,
}

/// Accepted range for product discounts and promo codes.
pub(super) fn check_percent(percent: i32) -> Result<i32> {
    if (1..=100).contains(&percent) {
        Ok(percent)
    } else {
        Err(ApiError::bad_request("discountPercent must be between 1 and 100"))
    }
}

fn new_discount(body: &DiscountBody) -> Result<NewDiscount> {
    let (Some(product_id), Some(percent)) = (body.product_id, body.discount_percent) else {
        return Err(ApiError::bad_request("productId and discountPercent are required"));
    };
    Ok(NewDiscount {
        product_id,
        discount_percent: check_percent(percent)?,
        expires_at: body.expires_at,
        is_active: body.is_active.unwrap_or(true),
    })
}

pub async fn list_discounts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Discount>>> {
    Ok(Json(state.db.list_active_discounts().await?))
}

pub async fn create_discount(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<DiscountBody>,
) -> Result<(StatusCode, Json<Discount>)> {
    let discount = state.db.insert_discount(&new_discount(&body)?).await?;
    Ok((StatusCode::CREATED, Json(discount)))
}

pub async fn update_discount(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<DiscountBody>,
) -> Result<Json<Discount>> {
    state
        .db
        .update_discount(id, &new_discount(&body)?)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Discount not found"))
}

pub async fn delete_discount(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Message>> {
    if state.db.delete_discount(id).await? {
        Ok(Message::json("Discount deleted"))
    } else {
        Err(ApiError::not_found("Discount not found"))
    }
}
