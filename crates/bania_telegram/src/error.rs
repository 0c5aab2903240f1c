use bania_common::{external_service_error, BaniaError, HttpStatusCode};
use thiserror::Error;

/// Telegram-specific error types.
#[derive(Error, Debug)]
pub enum TelegramError {
    /// No bot token configured
    #[error("TELEGRAM_BOT_TOKEN is not set")]
    MissingToken,

    /// Error occurred during a Bot API request
    #[error("Telegram API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// The Bot API answered `ok: false`
    #[error("Telegram API returned an error: {description} (Status: {status_code})")]
    ApiError { status_code: u16, description: String },

    /// Error parsing a Bot API response or update
    #[error("Failed to parse Telegram data: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl From<TelegramError> for BaniaError {
    fn from(err: TelegramError) -> Self {
        match err {
            TelegramError::MissingToken => BaniaError::ConfigError(err.to_string()),
            TelegramError::ParseError(e) => BaniaError::ParseError(format!("Telegram: {}", e)),
            other => external_service_error("Telegram", other),
        }
    }
}

impl HttpStatusCode for TelegramError {
    fn status_code(&self) -> u16 {
        match self {
            TelegramError::MissingToken => 500,
            TelegramError::RequestError(_) => 502,
            TelegramError::ApiError { .. } => 502,
            TelegramError::ParseError(_) => 400,
        }
    }
}
