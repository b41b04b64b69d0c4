//! Branches, categories and subcategories.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::extract::{optional, required, JsonBody, PathParam};
use super::Message;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{Branch, Category, Subcategory};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchBody {
    name: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    telegram_chat_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryBody {
    name: Option<String>,
    category_id: Option<i32>,
}

struct BranchFields {
    name: String,
    address: Option<String>,
    phone: Option<String>,
    telegram_chat_id: Option<String>,
}

fn branch_fields(body: BranchBody) -> Result<BranchFields> {
    let name = required(body.name.as_deref())
        .ok_or_else(|| ApiError::bad_request("Branch name is required"))?
        .to_string();
    Ok(BranchFields {
        name,
        address: optional(body.address.as_deref()),
        phone: optional(body.phone.as_deref()),
        telegram_chat_id: optional(body.telegram_chat_id.as_deref()),
    })
}

fn category_name(body: &CategoryBody) -> Result<&str> {
    required(body.name.as_deref()).ok_or_else(|| ApiError::bad_request("Category name is required"))
}

fn subcategory_fields(body: &SubcategoryBody) -> Result<(&str, i32)> {
    match (required(body.name.as_deref()), body.category_id) {
        (Some(name), Some(category_id)) => Ok((name, category_id)),
        _ => Err(ApiError::bad_request("Name and categoryId are required")),
    }
}

/// Public listing; notification chat ids are not exposed.
pub async fn list_branches(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Branch>>> {
    let branches = state.db.list_branches().await?;
    Ok(Json(branches.into_iter().map(Branch::redacted).collect()))
}

pub async fn list_branches_admin(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Branch>>> {
    Ok(Json(state.db.list_branches().await?))
}

pub async fn create_branch(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<BranchBody>,
) -> Result<(StatusCode, Json<Branch>)> {
    let fields = branch_fields(body)?;
    let branch = state
        .db
        .insert_branch(
            &fields.name,
            fields.address.as_deref(),
            fields.phone.as_deref(),
            fields.telegram_chat_id.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

pub async fn update_branch(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<BranchBody>,
) -> Result<Json<Branch>> {
    let fields = branch_fields(body)?;
    state
        .db
        .update_branch(
            id,
            &fields.name,
            fields.address.as_deref(),
            fields.phone.as_deref(),
            fields.telegram_chat_id.as_deref(),
        )
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Branch not found"))
}

pub async fn delete_branch(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Message>> {
    if state.db.delete_branch(id).await? {
        Ok(Message::json("Branch deleted"))
    } else {
        Err(ApiError::not_found("Branch not found"))
    }
}

pub async fn list_categories(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.db.list_categories().await?))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<CategoryBody>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = state.db.insert_category(category_name(&body)?).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<CategoryBody>,
) -> Result<Json<Category>> {
    state
        .db
        .update_category(id, category_name(&body)?)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Category not found"))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Message>> {
    if state.db.delete_category(id).await? {
        Ok(Message::json("Category deleted"))
    } else {
        Err(ApiError::not_found("Category not found"))
    }
}

pub async fn list_subcategories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Subcategory>>> {
    Ok(Json(state.db.list_subcategories().await?))
}

pub async fn create_subcategory(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<SubcategoryBody>,
) -> Result<(StatusCode, Json<Subcategory>)> {
    let (name, category_id) = subcategory_fields(&body)?;
    let subcategory = state.db.insert_subcategory(name, category_id).await?;
    Ok((StatusCode::CREATED, Json(subcategory)))
}

pub async fn update_subcategory(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<SubcategoryBody>,
) -> Result<Json<Subcategory>> {
    let (name, category_id) = subcategory_fields(&body)?;
    state
        .db
        .update_subcategory(id, name, category_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Subcategory not found"))
}

pub async fn delete_subcategory(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Message>> {
    if state.db.delete_subcategory(id).await? {
        Ok(Message::json("Subcategory deleted"))
    } else {
        Err(ApiError::not_found("Subcategory not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::{branch_fields, subcategory_fields, BranchBody, SubcategoryBody};

    #[test]
    fn branch_requires_a_name_and_blanks_become_null() {
        let missing = BranchBody {
            name: Some("   ".to_string()),
            address: None,
            phone: None,
            telegram_chat_id: None,
        };
        assert!(branch_fields(missing).is_err());

        let Ok(fields) = branch_fields(BranchBody {
            name: Some(" Center ".to_string()),
            address: Some(String::new()),
            phone: Some("+996555".to_string()),
            telegram_chat_id: None,
        }) else {
            unreachable!("name is present");
        };
        assert_eq!(fields.name, "Center");
        assert_eq!(fields.address, None);
        assert_eq!(fields.phone.as_deref(), Some("+996555"));
    }

    #[test]
    fn subcategory_needs_name_and_category() {
        let body = SubcategoryBody {
            name: Some("Meat".to_string()),
            category_id: None,
        };
        assert!(subcategory_fields(&body).is_err());

        let body = SubcategoryBody {
            name: Some("Meat".to_string()),
            category_id: Some(2),
        };
        assert!(matches!(subcategory_fields(&body), Ok(("Meat", 2))));
    }
}
