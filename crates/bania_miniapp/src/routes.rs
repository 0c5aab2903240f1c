use crate::handlers::{
    booking_page_handler, event_detail_handler, list_events_handler, list_page_handler,
    MiniAppState,
};
use axum::{routing::get, Router};
use bania_common::services::ViewCache;
use bania_db::EventRepository;
use std::sync::Arc;

/// Creates a router containing the public Mini App pages and their JSON feeds.
pub fn routes(events: Arc<dyn EventRepository>, cache: Arc<ViewCache>) -> Router {
    let state = Arc::new(MiniAppState { events, cache });

    Router::new()
        .route("/miniapp", get(list_page_handler))
        .route("/miniapp/book/{slug}", get(booking_page_handler))
        .route("/miniapp/events", get(list_events_handler))
        .route("/miniapp/events/{slug}", get(event_detail_handler))
        .with_state(state)
}
