use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;

use super::extract::{required, JsonBody};
use crate::auth::{hash_password, verify_password};
use crate::db::NewUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{AuthResponse, PublicUser, UserRecord};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    email: Option<String>,
    password: Option<String>,
}

fn user_exists() -> ApiError {
    ApiError::bad_request("A user with this email already exists")
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid email or password".to_string())
}

/// Passwords are stored and checked exactly as typed; only blank ones are refused.
fn typed_password(value: Option<&str>) -> Option<&str> {
    value.filter(|p| !p.trim().is_empty())
}

fn respond(state: &AppState, user: &UserRecord) -> Result<AuthResponse> {
    Ok(AuthResponse {
        token: state.tokens.issue(user)?,
        user: PublicUser::from(user),
    })
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<RegisterBody>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let (Some(name), Some(email), Some(password)) = (
        required(body.name.as_deref()),
        required(body.email.as_deref()),
        typed_password(body.password.as_deref()),
    ) else {
        return Err(ApiError::bad_request("Name, email and password are required"));
    };

    if state.db.find_user_by_email(email).await?.is_some() {
        return Err(user_exists());
    }

    let user = state
        .db
        .insert_user(&NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password).await?,
            is_admin: false,
        })
        .await
        .map_err(|e| match e {
            ApiError::Conflict(_) => user_exists(),
            other => other,
        })?;

    info!(user_id = user.id, "Registered user");
    Ok((StatusCode::CREATED, Json(respond(&state, &user)?)))
}

async fn check_credentials(state: &AppState, body: &LoginBody) -> Result<UserRecord> {
    let (Some(email), Some(password)) = (
        required(body.email.as_deref()),
        typed_password(body.password.as_deref()),
    ) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let user = state
        .db
        .find_user_by_email(email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if verify_password(password, &user.password).await? {
        Ok(user)
    } else {
        Err(invalid_credentials())
    }
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<AuthResponse>> {
    let user = check_credentials(&state, &body).await?;
    Ok(Json(respond(&state, &user)?))
}

/// Same as [`login`], restricted to admin accounts.
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<AuthResponse>> {
    let user = check_credentials(&state, &body).await?;
    if !user.is_admin {
        return Err(ApiError::Forbidden("Administrator access required".to_string()));
    }
    info!(user_id = user.id, "Admin signed in");
    Ok(Json(respond(&state, &user)?))
}
