use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::{resolve_pool_max_connections, Config};
use crate::db::BoodaiDb;
use crate::error::Result;
use crate::notify;
use crate::ports::{ImageStore, Notifier};
use crate::storage;

/// Shared handles every request handler reaches through `State<Arc<AppState>>`.
pub struct AppState {
    pub db: BoodaiDb,
    pub tokens: TokenIssuer,
    pub images: Arc<dyn ImageStore>,
    pub notifier: Arc<dyn Notifier>,
    /// Chat that receives orders for branches without their own chat id.
    pub default_chat_id: Option<String>,
}

impl AppState {
    #[must_use]
    pub fn new(
        db: BoodaiDb,
        tokens: TokenIssuer,
        images: Arc<dyn ImageStore>,
        notifier: Arc<dyn Notifier>,
        default_chat_id: Option<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            db,
            tokens,
            images,
            notifier,
            default_chat_id,
        })
    }

    /// Connects to the database and builds the configured storage and notifier backends.
    ///
    /// # Errors
    /// Returns an error if the database is unreachable or storage cannot be initialized.
    pub async fn from_config(config: &Config) -> Result<Arc<Self>> {
        let db = BoodaiDb::new(&config.database_url, resolve_pool_max_connections()).await?;
        let images = storage::from_config(&config.storage).await?;
        let notifier = notify::from_config(&config.telegram);

        Ok(Self::new(
            db,
            TokenIssuer::new(&config.jwt_secret, config.token_ttl_secs),
            images,
            notifier,
            config.telegram.default_chat_id.clone(),
        ))
    }
}
