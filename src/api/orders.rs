use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::extract::{JsonBody, PathParam, QueryParams};
use crate::error::{ApiError, Result};
use crate::ordering::submit_order;
use crate::state::AppState;
use crate::types::{Order, OrderReceipt, OrderRequest, OrderStatus};

#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    branch_id: Option<i32>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    status: Option<String>,
}

fn parse_status(body: &StatusBody) -> Result<OrderStatus> {
    let raw = body
        .status
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| ApiError::bad_request("status is required"))?;
    OrderStatus::try_from(raw).map_err(ApiError::BadRequest)
}

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<OrderRequest>,
) -> Result<(StatusCode, Json<OrderReceipt>)> {
    let receipt = submit_order(&state, &request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    QueryParams(filter): QueryParams<OrderFilter>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.db.list_orders(filter.branch_id, filter.limit).await?))
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Order>> {
    state
        .db
        .get_order(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Order not found"))
}

pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<StatusBody>,
) -> Result<Json<Order>> {
    let status = parse_status(&body)?;
    if !state.db.update_order_status(id, status).await? {
        return Err(ApiError::not_found("Order not found"));
    }
    info!(order_id = id, %status, "Order status changed");

    state
        .db
        .get_order(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Order not found"))
}
