use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::extract::{FormData, PathParam, QueryParams, UploadedFile};
use super::Message;
use crate::error::{ApiError, Result};
use crate::ports::ImageStore;
use crate::state::AppState;
use crate::storage::{content_type_for, delete_quietly, object_key, PRODUCT_PREFIX};
use crate::types::{Product, ProductInput};

#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    branch_id: Option<i32>,
    category_id: Option<i32>,
}

/// # Errors
/// Returns `BadRequest` when name, branchId or categoryId is missing or a
/// numeric field is malformed.
pub fn product_input(form: &FormData) -> Result<ProductInput> {
    let (Some(name), Some(branch_id), Some(category_id)) = (
        form.text("name"),
        form.id("branchId")?,
        form.id("categoryId")?,
    ) else {
        return Err(ApiError::bad_request("Name, branchId and categoryId are required"));
    };

    Ok(ProductInput {
        name: name.to_string(),
        description: form.text("description").map(ToString::to_string),
        price_small: form.number("priceSmall")?,
        price_medium: form.number("priceMedium")?,
        price_large: form.number("priceLarge")?,
        price_single: form.number("priceSingle")?,
        branch_id,
        category_id,
        sub_category_id: form.id("subCategoryId")?,
        is_pizza: form.flag("isPizza"),
        mini_recipe: form.text("miniRecipe").map(ToString::to_string),
    })
}

/// Stores an uploaded image under `prefix` and returns its key.
pub(super) async fn store_upload(
    images: &dyn ImageStore,
    prefix: &str,
    file: UploadedFile,
) -> Result<String> {
    let key = object_key(prefix, &file.filename)?;
    images.put(&key, file.bytes, content_type_for(&key)).await?;
    Ok(key)
}

async fn load_product(state: &AppState, id: i32) -> Result<Product> {
    state
        .db
        .get_product(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))
}

pub async fn list_products(
    State(state): State<Arc<AppState>>,
    QueryParams(filter): QueryParams<ProductFilter>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(
        state
            .db
            .list_products(filter.branch_id, filter.category_id)
            .await?,
    ))
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>)> {
    let mut form = FormData::read(multipart, "image").await?;
    let input = product_input(&form)?;
    let file = form
        .file
        .take()
        .ok_or_else(|| ApiError::bad_request("Product image is required"))?;

    let key = store_upload(state.images.as_ref(), PRODUCT_PREFIX, file).await?;
    let id = match state.db.insert_product(&input, &key).await {
        Ok(id) => id,
        Err(e) => {
            delete_quietly(state.images.as_ref(), &key).await;
            return Err(e);
        }
    };

    Ok((StatusCode::CREATED, Json(load_product(&state, id).await?)))
}

pub async fn update_product(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
    multipart: Multipart,
) -> Result<Json<Product>> {
    let mut form = FormData::read(multipart, "image").await?;
    let input = product_input(&form)?;

    let previous = state
        .db
        .get_product_image(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    let new_key = match form.file.take() {
        Some(file) => Some(store_upload(state.images.as_ref(), PRODUCT_PREFIX, file).await?),
        None => None,
    };
    let image = new_key.as_deref().unwrap_or(&previous);

    let updated = match state.db.update_product(id, &input, image).await {
        Ok(updated) => updated,
        Err(e) => {
            if let Some(key) = &new_key {
                delete_quietly(state.images.as_ref(), key).await;
            }
            return Err(e);
        }
    };

    if !updated {
        if let Some(key) = &new_key {
            delete_quietly(state.images.as_ref(), key).await;
        }
        return Err(ApiError::not_found("Product not found"));
    }
    if new_key.is_some() {
        delete_quietly(state.images.as_ref(), &previous).await;
    }

    Ok(Json(load_product(&state, id).await?))
}

pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Message>> {
    let image = state
        .db
        .delete_product(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    delete_quietly(state.images.as_ref(), &image).await;
    info!(product_id = id, "Deleted product");
    Ok(Message::json("Product deleted"))
}
