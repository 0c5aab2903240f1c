use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use bania_common::services::NotificationService;
use bania_common::{json_error, json_error_with_details};
use bania_config::AppConfig;
use bania_db::BookingRepository;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::error::CalendlyError;
use crate::models::WebhookEvent;
use crate::signature::{verify_signature, SIGNATURE_HEADER};
use crate::webhook::{process_webhook, WebhookOutcome};

// --- State for Calendly Handlers ---
pub struct CalendlyState {
    pub config: Arc<AppConfig>,
    pub bookings: Arc<dyn BookingRepository>,
    pub notifier: Option<Arc<dyn NotificationService>>,
}

fn invalid_payload(details: impl Into<String>) -> Response {
    json_error_with_details(
        StatusCode::BAD_REQUEST,
        "Invalid payload",
        Value::String(details.into()),
    )
}

/// Receives Calendly webhook deliveries.
#[axum::debug_handler]
pub async fn calendly_webhook_handler(
    State(state): State<Arc<CalendlyState>>,
    headers: HeaderMap,
    body: String, // Raw body for signature verification
) -> Response {
    // --- Verify Signature ---
    match state.config.calendly_signing_key() {
        Some(key) => {
            let header = headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok());
            if let Err(e) = verify_signature(body.as_bytes(), header, key) {
                error!("Invalid Calendly webhook signature: {}", e);
                return json_error(StatusCode::UNAUTHORIZED, "Invalid signature");
            }
        }
        None if state.config.is_production() => {
            error!("Calendly webhook signing key not set, accepting unsigned delivery");
        }
        None => warn!("Calendly webhook signing key not set, skipping verification"),
    }

    // --- Parse Payload ---
    let raw: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            error!("Calendly webhook body is not JSON: {}", e);
            return invalid_payload(e.to_string());
        }
    };
    let event: WebhookEvent = match serde_json::from_value(raw.clone()) {
        Ok(ev) => ev,
        Err(e) => {
            error!("Invalid Calendly webhook payload: {}", e);
            return invalid_payload(e.to_string());
        }
    };
    if let Err(msg) = event.validate() {
        error!("Invalid Calendly webhook payload: {}", msg);
        return invalid_payload(msg);
    }
    debug!("Calendly webhook event {}", event.name());

    match process_webhook(event, raw, state.bookings.as_ref(), state.notifier.as_ref()).await {
        Ok(WebhookOutcome::Duplicate) => {
            Json(json!({ "ok": true, "message": "Already processed" })).into_response()
        }
        Ok(WebhookOutcome::CancelNotFound) => {
            Json(json!({ "ok": true, "message": "Booking not found" })).into_response()
        }
        Ok(_) => Json(json!({ "ok": true })).into_response(),
        Err(CalendlyError::Database(e)) => {
            error!("Database error while processing Calendly webhook: {}", e);
            json_error_with_details(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                Value::String(e.to_string()),
            )
        }
        Err(e) => {
            error!("Calendly webhook error: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Health check for the webhook endpoint.
#[axum::debug_handler]
pub async fn calendly_webhook_health_handler() -> Json<Value> {
    Json(json!({
        "ok": true,
        "message": "Calendly webhook endpoint",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}
