#![allow(dead_code)]
#![cfg(feature = "openapi")]
use bania_common::models::{
    Booking, BookingStatus, DashboardStats, Event, EventPatch, NewEvent, PaymentStatus,
    PaymentUpdate,
};
use utoipa::OpenApi;

use crate::logic::{Dashboard, ReorderRequest, ToggleActiveRequest};

#[utoipa::path(
    get,
    path = "/admin/events", // Path relative to /api
    params(("X-Admin-Secret" = String, Header, description = "Admin API secret")),
    responses(
        (status = 200, description = "All events by display order", body = Vec<Event>),
        (status = 401, description = "Missing or wrong admin secret")
    ),
    tag = "Admin Events"
)]
fn doc_list_events_handler() {}

#[utoipa::path(
    post,
    path = "/admin/events",
    request_body = NewEvent,
    responses(
        (status = 201, description = "{success: true, event}"),
        (status = 400, description = "Missing name, slug, duration or calendly_url"),
        (status = 409, description = "Calendly event uri already stored")
    ),
    tag = "Admin Events"
)]
fn doc_create_event_handler() {}

#[utoipa::path(
    patch,
    path = "/admin/events/{id}",
    params(("id" = uuid::Uuid, Path, description = "Event id")),
    request_body = EventPatch,
    responses(
        (status = 200, description = "{success: true, event}"),
        (status = 400, description = "Invalid or empty patch"),
        (status = 404, description = "Unknown event")
    ),
    tag = "Admin Events"
)]
fn doc_update_event_handler() {}

#[utoipa::path(
    delete,
    path = "/admin/events/{id}",
    params(("id" = uuid::Uuid, Path, description = "Event id")),
    responses(
        (status = 200, description = "{success: true}"),
        (status = 404, description = "Unknown event")
    ),
    tag = "Admin Events"
)]
fn doc_delete_event_handler() {}

#[utoipa::path(
    post,
    path = "/admin/events/{id}/active",
    params(("id" = uuid::Uuid, Path, description = "Event id")),
    request_body = ToggleActiveRequest,
    responses(
        (status = 200, description = "{success: true, event}"),
        (status = 404, description = "Unknown event")
    ),
    tag = "Admin Events"
)]
fn doc_toggle_event_active_handler() {}

#[utoipa::path(
    delete,
    path = "/admin/events/{id}/photo",
    params(("id" = uuid::Uuid, Path, description = "Event id")),
    responses(
        (status = 200, description = "Photo removed, {success: true, event}"),
        (status = 404, description = "Unknown event")
    ),
    tag = "Admin Events"
)]
fn doc_remove_event_photo_handler() {}

#[utoipa::path(
    post,
    path = "/admin/events/reorder",
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "{success: true, updated}"),
        (status = 500, description = "Failed to reorder some events")
    ),
    tag = "Admin Events"
)]
fn doc_reorder_events_handler() {}

#[utoipa::path(
    post,
    path = "/admin/events/sync",
    responses(
        (status = 200, description = "{success: true, created, updated, deactivated, failed}"),
        (status = 500, description = "Calendly API token not configured"),
        (status = 502, description = "Calendly API error")
    ),
    tag = "Admin Events"
)]
fn doc_sync_events_handler() {}

#[utoipa::path(
    post,
    path = "/admin/upload",
    request_body(content = String, content_type = "multipart/form-data", description = "Form fields `file` and `eventId`"),
    responses(
        (status = 200, description = "{success: true, url}"),
        (status = 400, description = "Missing file or eventId, or unreadable image"),
        (status = 404, description = "Unknown event"),
        (status = 502, description = "Storage error")
    ),
    tag = "Admin Events"
)]
fn doc_upload_photo_handler() {}

#[utoipa::path(
    get,
    path = "/admin/bookings",
    params(
        ("status" = Option<BookingStatus>, Query, description = "scheduled | cancelled | completed"),
        ("payment_status" = Option<PaymentStatus>, Query, description = "pending | paid | refunded"),
        ("search" = Option<String>, Query, description = "Substring of invitee name, email or phone"),
        ("from" = Option<String>, Query, description = "Earliest start time (RFC 3339)"),
        ("to" = Option<String>, Query, description = "Latest start time (RFC 3339)"),
        ("limit" = Option<i64>, Query, description = "1..=100, default 50"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses((status = 200, description = "Bookings, latest start first", body = Vec<Booking>)),
    tag = "Admin Bookings"
)]
fn doc_list_bookings_handler() {}

#[utoipa::path(
    get,
    path = "/admin/bookings/{id}",
    params(("id" = uuid::Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking", body = Booking),
        (status = 404, description = "Unknown booking")
    ),
    tag = "Admin Bookings"
)]
fn doc_get_booking_handler() {}

#[utoipa::path(
    patch,
    path = "/admin/bookings/{id}/payment",
    params(("id" = uuid::Uuid, Path, description = "Booking id")),
    request_body = PaymentUpdate,
    responses(
        (status = 200, description = "{success: true, booking}"),
        (status = 400, description = "Negative amount"),
        (status = 404, description = "Unknown booking")
    ),
    tag = "Admin Bookings"
)]
fn doc_update_payment_handler() {}

#[utoipa::path(
    post,
    path = "/admin/bookings/{id}/mark-paid",
    params(("id" = uuid::Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "{success: true, booking}"),
        (status = 404, description = "Unknown booking")
    ),
    tag = "Admin Bookings"
)]
fn doc_mark_booking_paid_handler() {}

#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses((status = 200, description = "Counters and the next bookings", body = Dashboard)),
    tag = "Admin Bookings"
)]
fn doc_dashboard_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_list_events_handler,
        doc_create_event_handler,
        doc_update_event_handler,
        doc_delete_event_handler,
        doc_toggle_event_active_handler,
        doc_remove_event_photo_handler,
        doc_reorder_events_handler,
        doc_sync_events_handler,
        doc_upload_photo_handler,
        doc_list_bookings_handler,
        doc_get_booking_handler,
        doc_update_payment_handler,
        doc_mark_booking_paid_handler,
        doc_dashboard_handler
    ),
    components(schemas(
        Event, NewEvent, EventPatch, Booking, PaymentUpdate, DashboardStats, Dashboard,
        ReorderRequest, ToggleActiveRequest
    )),
    tags(
        (name = "Admin Events", description = "Event catalog management"),
        (name = "Admin Bookings", description = "Bookings, payments and dashboard")
    )
)]
pub struct AdminApiDoc;
