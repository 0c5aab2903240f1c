use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use bania_config::AppConfig;
use constant_time_eq::constant_time_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::bot::reply_for;
use crate::client::TelegramClient;
use crate::models::Update;

pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

pub struct TelegramState {
    pub config: Arc<AppConfig>,
    /// `None` when no bot token is configured.
    pub client: Option<TelegramClient>,
}

impl TelegramState {
    fn webhook_secret(&self) -> Option<&str> {
        self.config
            .telegram
            .as_ref()
            .and_then(|t| t.webhook_secret.as_deref())
            .filter(|s| !s.is_empty())
    }

    fn webapp_url(&self) -> &str {
        self.config
            .telegram
            .as_ref()
            .and_then(|t| t.webapp_url.as_deref())
            .unwrap_or_default()
    }
}

fn not_ok(status: StatusCode) -> Response {
    (status, Json(json!({ "ok": false }))).into_response()
}

/// Receives Bot API updates and answers `/start` and `/help`.
#[axum::debug_handler]
pub async fn telegram_webhook_handler(
    State(state): State<Arc<TelegramState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !state.config.use_telegram {
        return not_ok(StatusCode::SERVICE_UNAVAILABLE);
    }

    if let Some(secret) = state.webhook_secret() {
        let provided = headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default();
        if !constant_time_eq(provided.as_bytes(), secret.as_bytes()) {
            warn!("Telegram webhook secret token mismatch");
            return not_ok(StatusCode::UNAUTHORIZED);
        }
    }

    let Some(client) = state.client.as_ref() else {
        error!("Telegram webhook error: TELEGRAM_BOT_TOKEN is not set");
        return not_ok(StatusCode::INTERNAL_SERVER_ERROR);
    };

    let update: Update = match serde_json::from_str(&body) {
        Ok(u) => u,
        Err(e) => {
            warn!("Unparseable Telegram update: {}", e);
            return not_ok(StatusCode::BAD_REQUEST);
        }
    };
    debug!("Telegram update {}", update.update_id);

    if let Some(reply) = reply_for(&update, state.webapp_url()) {
        if let Err(e) = client.send_message(&reply).await {
            error!("Telegram webhook error: {}", e);
            return not_ok(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
    Json(json!({ "ok": true })).into_response()
}

#[axum::debug_handler]
pub async fn telegram_webhook_health_handler() -> Json<Value> {
    Json(json!({ "ok": true, "message": "Telegram webhook endpoint" }))
}
