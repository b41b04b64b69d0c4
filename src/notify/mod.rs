//! Order notifications to branch chats.

mod message;
mod telegram;

use std::sync::Arc;

use tracing::{info, warn};

pub use message::{escape_html, format_order_message};
pub use telegram::{DisabledNotifier, TelegramNotifier};

use crate::config::TelegramConfig;
use crate::ports::Notifier;

#[must_use]
pub fn from_config(config: &TelegramConfig) -> Arc<dyn Notifier> {
    match &config.bot_token {
        Some(token) => {
            info!("Order notifications go through {}", config.api_base);
            Arc::new(TelegramNotifier::new(&config.api_base, token))
        }
        None => {
            warn!("telegram_bot_token is not set; order submission will fail until it is");
            Arc::new(DisabledNotifier)
        }
    }
}
