use bania_common::HTTP_CLIENT;
use bania_config::TelegramConfig;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::TelegramError;
use crate::models::{ApiResponse, SendMessage};

/// Minimal Bot API client.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, TelegramError> {
        Self::with_client(HTTP_CLIENT.clone(), config)
    }

    pub fn with_client(client: Client, config: &TelegramConfig) -> Result<Self, TelegramError> {
        let bot_token = config
            .bot_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(TelegramError::MissingToken)?
            .to_string();
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            bot_token,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }

    pub async fn send_message(&self, message: &SendMessage) -> Result<(), TelegramError> {
        debug!("sendMessage to chat {}", message.chat_id);
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(message)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let parsed: ApiResponse<Value> = serde_json::from_slice(&bytes)?;
        if !status.is_success() || !parsed.ok {
            let description = parsed
                .description
                .unwrap_or_else(|| "unknown error".to_string());
            error!("Telegram sendMessage failed ({}): {}", status, description);
            return Err(TelegramError::ApiError {
                status_code: status.as_u16(),
                description,
            });
        }
        Ok(())
    }
}
