use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::discounts::check_percent;
use super::extract::{required, JsonBody, PathParam};
use super::Message;
use crate::db::NewPromoCode;
use crate::error::{ApiError, Result};
use crate::ordering::resolve_promo;
use crate::state::AppState;
use crate::types::PromoCode;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeBody {
    code: Option<String>,
    discount_percent: Option<i32>,
    expires_at: Option<DateTime<Utc>>,
    is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CheckBody {
    code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    code: String,
    discount_percent: i32,
}

fn new_promo_code(body: &PromoCodeBody) -> Result<NewPromoCode> {
    let (Some(code), Some(percent)) = (required(body.code.as_deref()), body.discount_percent) else {
        return Err(ApiError::bad_request("code and discountPercent are required"));
    };
    Ok(NewPromoCode {
        code: code.to_string(),
        discount_percent: check_percent(percent)?,
        expires_at: body.expires_at,
        is_active: body.is_active.unwrap_or(true),
    })
}

pub async fn list_promo_codes(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PromoCode>>> {
    Ok(Json(state.db.list_promo_codes().await?))
}

pub async fn create_promo_code(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<PromoCodeBody>,
) -> Result<(StatusCode, Json<PromoCode>)> {
    let promo = state.db.insert_promo_code(&new_promo_code(&body)?).await?;
    Ok((StatusCode::CREATED, Json(promo)))
}

pub async fn update_promo_code(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<PromoCodeBody>,
) -> Result<Json<PromoCode>> {
    state
        .db
        .update_promo_code(id, &new_promo_code(&body)?)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Promo code not found"))
}

pub async fn delete_promo_code(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Message>> {
    if state.db.delete_promo_code(id).await? {
        Ok(Message::json("Promo code deleted"))
    } else {
        Err(ApiError::not_found("Promo code not found"))
    }
}

/// Public lookup used by the cart before checkout.
pub async fn check_promo_code(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<CheckBody>,
) -> Result<Json<CheckResponse>> {
    let code = required(body.code.as_deref())
        .ok_or_else(|| ApiError::bad_request("code is required"))?;
    let promo = resolve_promo(&state.db, code, Utc::now()).await?;
    Ok(Json(CheckResponse {
        code: promo.code,
        discount_percent: promo.discount_percent,
    }))
}
