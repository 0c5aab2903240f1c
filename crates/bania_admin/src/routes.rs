use crate::auth::admin_auth_middleware;
use crate::handlers::{
    create_event_handler, dashboard_handler, delete_event_handler, get_booking_handler,
    list_bookings_handler, list_events_handler, mark_booking_paid_handler,
    remove_event_photo_handler, reorder_events_handler, sync_events_handler,
    toggle_event_active_handler, update_event_handler, update_payment_handler,
    upload_photo_handler, AdminState,
};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;

/// Largest accepted photo upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Creates a router containing all admin routes, guarded by the admin secret.
pub fn routes(state: AdminState) -> Router {
    let auth_config = state.config.clone();
    let admin_state = Arc::new(state);

    Router::new()
        .route("/admin/events", get(list_events_handler).post(create_event_handler))
        .route("/admin/events/reorder", post(reorder_events_handler))
        .route("/admin/events/sync", post(sync_events_handler))
        .route(
            "/admin/events/{id}",
            patch(update_event_handler).delete(delete_event_handler),
        )
        .route("/admin/events/{id}/active", post(toggle_event_active_handler))
        .route("/admin/events/{id}/photo", delete(remove_event_photo_handler))
        .route(
            "/admin/upload",
            post(upload_photo_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/admin/bookings", get(list_bookings_handler))
        .route("/admin/bookings/{id}", get(get_booking_handler))
        .route("/admin/bookings/{id}/payment", patch(update_payment_handler))
        .route("/admin/bookings/{id}/mark-paid", post(mark_booking_paid_handler))
        .route("/admin/dashboard", get(dashboard_handler))
        .layer(middleware::from_fn_with_state(auth_config, admin_auth_middleware))
        .with_state(admin_state)
}
