//! HTTP surface: handlers grouped by resource and the router that wires them.

mod auth;
mod catalog;
mod discounts;
pub mod extract;
mod images;
mod orders;
mod products;
mod promo_codes;
mod stories;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::{require_admin, require_auth};
use crate::error::Result;
use crate::state::AppState;

/// Largest accepted request body, multipart uploads included.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub const BANNER: &str = "Booday Pizza API";

/// `{"message": "..."}` confirmation returned by deletes.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn json(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

async fn banner() -> &'static str {
    BANNER
}

async fn health(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    state.db.ping().await?;
    Ok(Json(json!({ "status": "ok", "database": "up" })))
}

/// Any origin when the list is empty, otherwise only the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let allowed = origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|e| warn!("Ignoring CORS origin {origin}: {e}"))
                .ok()
        })
        .collect::<Vec<_>>();
    base.allow_origin(AllowOrigin::list(allowed))
}

pub fn router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let public = Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/admin/login", post(auth::admin_login))
        .route("/branches", get(catalog::list_branches))
        .route("/categories", get(catalog::list_categories))
        .route("/products", get(products::list_products))
        .route("/discounts", get(discounts::list_discounts))
        .route("/stories", get(stories::list_stories))
        .route("/promo-codes/check", post(promo_codes::check_promo_code))
        .route("/orders", post(orders::create_order))
        .route("/images/*key", get(images::get_image));

    let signed_in = Router::new()
        .route("/subcategories", get(catalog::list_subcategories))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/admin/branches", get(catalog::list_branches_admin))
        .route("/branches", post(catalog::create_branch))
        .route(
            "/branches/:id",
            put(catalog::update_branch).delete(catalog::delete_branch),
        )
        .route("/categories", post(catalog::create_category))
        .route(
            "/categories/:id",
            put(catalog::update_category).delete(catalog::delete_category),
        )
        .route("/subcategories", post(catalog::create_subcategory))
        .route(
            "/subcategories/:id",
            put(catalog::update_subcategory).delete(catalog::delete_subcategory),
        )
        .route("/products", post(products::create_product))
        .route(
            "/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/discounts", post(discounts::create_discount))
        .route(
            "/discounts/:id",
            put(discounts::update_discount).delete(discounts::delete_discount),
        )
        .route(
            "/promo-codes",
            get(promo_codes::list_promo_codes).post(promo_codes::create_promo_code),
        )
        .route(
            "/promo-codes/:id",
            put(promo_codes::update_promo_code).delete(promo_codes::delete_promo_code),
        )
        .route("/stories", post(stories::create_story))
        .route(
            "/stories/:id",
            put(stories::update_story).delete(stories::delete_story),
        )
        .route("/orders", get(orders::list_orders))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/status", put(orders::update_order_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public)
        .merge(signed_in)
        .merge(admin)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}
