//! Telegram chat transport.
//!
//! Each user configures their own bot token and chat id, so credentials
//! arrive per call. The engine only ever uses the `sendMessage` method.

use tracing::{debug, error};

use crate::config::TelegramConfig;

/// Chat transport backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramClient {
    api_base: String,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl domain::services::ChatTransport for TelegramClient {
    async fn send(&self, bot_token: &str, chat_id: &str, text: &str) -> bool {
        if bot_token.is_empty() || chat_id.is_empty() {
            debug!("Telegram credentials missing, skipping send");
            return false;
        }

        let url = format!("{}/bot{}/sendMessage", self.api_base, bot_token);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML"
        });

        match self.client.post(&url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(chat_id = %chat_id, "Telegram message sent");
                true
            }
            Ok(resp) => {
                error!(chat_id = %chat_id, status = %resp.status(), "Telegram API rejected the message");
                false
            }
            Err(e) => {
                error!(chat_id = %chat_id, "Telegram request failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::services::ChatTransport;

    #[tokio::test]
    async fn test_missing_credentials_skip_send() {
        let client = TelegramClient::new(&TelegramConfig::default());
        assert!(!client.send("", "chat-1", "hello").await);
        assert!(!client.send("token", "", "hello").await);
    }
}
