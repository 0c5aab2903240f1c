#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::sync::SyncReport;

#[utoipa::path(
    post,
    path = "/calendly/webhook", // Path relative to /api
    request_body(
        content = serde_json::Value,
        description = "Calendly delivery: {event: invitee.created | invitee.canceled | routing_form_submission.created, payload}"
    ),
    params(
        ("calendly-webhook-signature" = Option<String>, Header, description = "t=<unix ts>,v1=<hex hmac-sha256>")
    ),
    responses(
        (status = 200, description = "Processed, already processed, or cancellation of an unknown booking"),
        (status = 400, description = "Payload does not match a known event"),
        (status = 401, description = "Signature mismatch"),
        (status = 500, description = "Store failure")
    ),
    tag = "Calendly Webhooks"
)]
fn doc_calendly_webhook_handler() {}

#[utoipa::path(
    get,
    path = "/calendly/webhook",
    responses((status = 200, description = "Endpoint is up")),
    tag = "Calendly Webhooks"
)]
fn doc_calendly_webhook_health_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(doc_calendly_webhook_handler, doc_calendly_webhook_health_handler),
    components(schemas(SyncReport)),
    tags((name = "Calendly Webhooks", description = "Booking ingestion from Calendly"))
)]
pub struct CalendlyApiDoc;
