//! Booday Pizza storefront API.
//!
//! A PostgreSQL-backed axum service for the public menu, the admin panel and
//! order intake. Orders are forwarded to branch chats through the Telegram
//! Bot API; images live on local disk or in an S3-compatible bucket.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod notify;
pub mod ordering;
pub mod ports;
pub mod pricing;
pub mod server;
pub mod state;
pub mod storage;
pub mod types;

pub use config::Config;
pub use db::BoodaiDb;
pub use error::{ApiError, Result};
pub use state::AppState;
