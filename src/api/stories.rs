use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use super::extract::{FormData, PathParam};
use super::products::store_upload;
use super::Message;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::storage::{delete_quietly, STORY_PREFIX};
use crate::types::Story;

pub async fn list_stories(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Story>>> {
    Ok(Json(state.db.list_stories().await?))
}

pub async fn create_story(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Story>)> {
    let file = FormData::read(multipart, "image")
        .await?
        .file
        .ok_or_else(|| ApiError::bad_request("Story image is required"))?;

    let key = store_upload(state.images.as_ref(), STORY_PREFIX, file).await?;
    match state.db.insert_story(&key).await {
        Ok(story) => Ok((StatusCode::CREATED, Json(story))),
        Err(e) => {
            delete_quietly(state.images.as_ref(), &key).await;
            Err(e)
        }
    }
}

/// Without a new file the story is returned unchanged.
pub async fn update_story(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
    multipart: Multipart,
) -> Result<Json<Story>> {
    let Some(file) = FormData::read(multipart, "image").await?.file else {
        return state
            .db
            .get_story(id)
            .await?
            .map(Json)
            .ok_or_else(|| ApiError::not_found("Story not found"));
    };

    if state.db.get_story(id).await?.is_none() {
        return Err(ApiError::not_found("Story not found"));
    }

    let key = store_upload(state.images.as_ref(), STORY_PREFIX, file).await?;
    match state.db.update_story_image(id, &key).await {
        Ok(Some((story, previous))) => {
            delete_quietly(state.images.as_ref(), &previous).await;
            Ok(Json(story))
        }
        Ok(None) => {
            delete_quietly(state.images.as_ref(), &key).await;
            Err(ApiError::not_found("Story not found"))
        }
        Err(e) => {
            delete_quietly(state.images.as_ref(), &key).await;
            Err(e)
        }
    }
}

pub async fn delete_story(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Message>> {
    let image = state
        .db
        .delete_story(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Story not found"))?;

    delete_quietly(state.images.as_ref(), &image).await;
    Ok(Message::json("Story deleted"))
}
