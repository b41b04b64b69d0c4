use std::sync::Arc;

use axum::{
    extract::State,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use super::extract::PathParam;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::storage::is_safe_key;

/// Serves a stored object. Keys never change content, so clients may cache them.
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    PathParam(key): PathParam<String>,
) -> Result<Response> {
    if !is_safe_key(&key) {
        return Err(ApiError::not_found("Image not found"));
    }

    let object = state.images.get(&key).await?;
    Ok((
        [
            (CONTENT_TYPE, object.content_type),
            (CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        object.bytes,
    )
        .into_response())
}
