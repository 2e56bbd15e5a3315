use chrono::NaiveDateTime;
use reqwest::Client;
use std::time::Duration;

use crate::api::ApiError;
use crate::models::{MarketIndex, Signal};

pub const TELEGRAM_BASE_URL: &str = "https://api.telegram.org";
const SERVICE: &str = "Telegram";
const SEND_TIMEOUT_SECS: u64 = 5;

/// Fire-and-forget delivery of a text message
#[allow(async_fn_in_trait)]
pub trait Notifier {
    /// Best effort; failures are logged and swallowed
    async fn notify(&self, message: &str);
}

/// `"NIFTY Signal: BUY at 10:42:05"`
pub fn format_signal_message(index: MarketIndex, signal: Signal, at: NaiveDateTime) -> String {
    format!("{} Signal: {} at {}", index, signal, at.format("%H:%M:%S"))
}

#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self::with_base_url(TELEGRAM_BASE_URL.to_string(), bot_token, chat_id)
    }

    pub fn with_base_url(base_url: String, bot_token: String, chat_id: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
        }
    }

    pub async fn send_message(&self, text: &str) -> Result<(), ApiError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let response = self
            .client
            .get(&url)
            .query(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        Ok(())
    }
}

impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) {
        match self.send_message(message).await {
            Ok(()) => tracing::info!("📨 Sent notification: {}", message),
            Err(e) => tracing::warn!("Notification dropped: {}", e),
        }
    }
}
