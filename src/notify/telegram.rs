use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use super::Notifier;
use crate::config::TelegramConfig;
use crate::utils::error::{AppError, Result};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Delivers rendered messages via the Telegram Bot API. The user id is
/// the chat id.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        Self::with_api_base(config, TELEGRAM_API_BASE)
    }

    pub fn with_api_base(config: &TelegramConfig, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token: config.bot_token.clone(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, user_id: i64, message: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let payload = json!({
            "chat_id": user_id,
            "text": message,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Notify(format!(
                "sendMessage returned {status}: {body}"
            )));
        }

        debug!(user_id, "notification delivered");
        Ok(())
    }
}
