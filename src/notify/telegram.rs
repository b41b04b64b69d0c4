use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::ports::{Notifier, PortFuture};

/// Telegram Bot API `sendMessage` client.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramNotifier {
    #[must_use]
    pub fn new(api_base: &str, bot_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

impl Notifier for TelegramNotifier {
    fn send<'a>(&'a self, chat_id: &'a str, text: &'a str) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let payload = SendMessageRequest {
                chat_id,
                text,
                parse_mode: "HTML",
            };

            // reqwest errors can echo the URL, which carries the bot token.
            let response = self
                .client
                .post(self.endpoint())
                .json(&payload)
                .send()
                .await
                .map_err(|e| {
                    ApiError::NotificationError(format!(
                        "Telegram request failed: {}",
                        e.without_url()
                    ))
                })?;

            let status = response.status();
            let body: Option<TelegramResponse> = response.json().await.ok();
            match body {
                Some(TelegramResponse { ok: true, .. }) if status.is_success() => {
                    debug!(chat_id, "order notification delivered");
                    Ok(())
                }
                other => {
                    let description = other
                        .and_then(|b| b.description)
                        .unwrap_or_else(|| "no description".to_string());
                    warn!(chat_id, %status, "Telegram rejected message: {description}");
                    Err(ApiError::NotificationError(format!(
                        "Telegram returned {status}: {description}"
                    )))
                }
            }
        })
    }
}

/// Used when no bot token is configured; every send fails so orders roll back.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

impl Notifier for DisabledNotifier {
    fn send<'a>(&'a self, _chat_id: &'a str, _text: &'a str) -> PortFuture<'a, ()> {
        Box::pin(async {
            Err(ApiError::NotificationError(
                "Order notifications are not configured".to_string(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DisabledNotifier, TelegramNotifier};
    use crate::error::ApiError;
    use crate::ports::Notifier;

    #[test]
    fn endpoint_includes_token() {
        let notifier = TelegramNotifier::new("https://api.telegram.org/", "123:abc");
        assert_eq!(
            notifier.endpoint(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[tokio::test]
    async fn disabled_notifier_always_fails() {
        assert!(matches!(
            DisabledNotifier.send("-100", "hi").await,
            Err(ApiError::NotificationError(_))
        ));
    }
}
