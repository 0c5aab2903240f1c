#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

#[utoipa::path(
    post,
    path = "/telegram/webhook", // Path relative to /api
    request_body(content = serde_json::Value, description = "Bot API update"),
    params(
        ("X-Telegram-Bot-Api-Secret-Token" = Option<String>, Header, description = "Required when a webhook secret is configured")
    ),
    responses(
        (status = 200, description = "Update handled"),
        (status = 401, description = "Secret token mismatch"),
        (status = 500, description = "Bot not configured or reply failed"),
        (status = 503, description = "Telegram disabled by configuration")
    ),
    tag = "Telegram"
)]
fn doc_telegram_webhook_handler() {}

#[utoipa::path(
    get,
    path = "/telegram/webhook",
    responses((status = 200, description = "Endpoint is up")),
    tag = "Telegram"
)]
fn doc_telegram_webhook_health_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(doc_telegram_webhook_handler, doc_telegram_webhook_health_handler),
    tags((name = "Telegram", description = "Bot commands webhook"))
)]
pub struct TelegramApiDoc;
