#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{EmbedQuery, EventDetail, MiniAppEvent};

#[utoipa::path(
    get,
    path = "/miniapp/events", // Path relative to /api
    responses((status = 200, description = "{events: [...]}, active events by display order")),
    tag = "Mini App"
)]
fn doc_list_events_handler() {}

#[utoipa::path(
    get,
    path = "/miniapp/events/{slug}",
    params(("slug" = String, Path, description = "Event slug"), EmbedQuery),
    responses(
        (status = 200, description = "Event with its Calendly embed url", body = EventDetail),
        (status = 404, description = "No active event with this slug")
    ),
    tag = "Mini App"
)]
fn doc_event_detail_handler() {}

#[utoipa::path(
    get,
    path = "/miniapp",
    responses((status = 200, description = "HTML list of active events", body = String, content_type = "text/html")),
    tag = "Mini App"
)]
fn doc_list_page_handler() {}

#[utoipa::path(
    get,
    path = "/miniapp/book/{slug}",
    params(("slug" = String, Path, description = "Event slug"), EmbedQuery),
    responses(
        (status = 200, description = "HTML page embedding the Calendly widget", body = String, content_type = "text/html"),
        (status = 404, description = "Event not found page", body = String, content_type = "text/html")
    ),
    tag = "Mini App"
)]
fn doc_booking_page_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_list_events_handler,
        doc_event_detail_handler,
        doc_list_page_handler,
        doc_booking_page_handler
    ),
    components(schemas(MiniAppEvent, EventDetail)),
    tags((name = "Mini App", description = "Telegram Mini App browsing and booking"))
)]
pub struct MiniAppApiDoc;
