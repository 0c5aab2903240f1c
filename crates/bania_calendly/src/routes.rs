use crate::handlers::{calendly_webhook_handler, calendly_webhook_health_handler, CalendlyState};
use axum::{routing::post, Router};
use bania_common::services::NotificationService;
use bania_config::AppConfig;
use bania_db::BookingRepository;
use std::sync::Arc;

/// Creates a router containing the Calendly webhook routes.
pub fn routes(
    config: Arc<AppConfig>,
    bookings: Arc<dyn BookingRepository>,
    notifier: Option<Arc<dyn NotificationService>>,
) -> Router {
    let calendly_state = Arc::new(CalendlyState {
        config,
        bookings,
        notifier,
    });

    Router::new()
        .route(
            "/calendly/webhook",
            post(calendly_webhook_handler).get(calendly_webhook_health_handler),
        )
        .with_state(calendly_state)
}
