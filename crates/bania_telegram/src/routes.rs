use crate::client::TelegramClient;
use crate::handlers::{telegram_webhook_handler, telegram_webhook_health_handler, TelegramState};
use axum::{routing::post, Router};
use bania_config::AppConfig;
use std::sync::Arc;
use tracing::warn;

/// Creates a router containing the bot webhook routes.
pub fn routes(config: Arc<AppConfig>) -> Router {
    let client = config
        .telegram
        .as_ref()
        .and_then(|t| match TelegramClient::new(t) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Telegram bot disabled: {}", e);
                None
            }
        });
    routes_with_client(config, client)
}

pub fn routes_with_client(config: Arc<AppConfig>, client: Option<TelegramClient>) -> Router {
    let telegram_state = Arc::new(TelegramState { config, client });

    Router::new()
        .route(
            "/telegram/webhook",
            post(telegram_webhook_handler).get(telegram_webhook_health_handler),
        )
        .with_state(telegram_state)
}
