pub mod client; // Calendly API v2
pub mod doc;
pub mod error;
pub mod extract; // Custom-question heuristics
pub mod handlers;
pub mod models;
pub mod routes;
pub mod signature;
pub mod sync; // Event-type reconciliation
pub mod webhook;

// Re-export for main backend
pub use client::{CalendlyClient, EventTypeSource};
pub use error::CalendlyError;
pub use handlers::CalendlyState;
pub use routes::routes;
pub use sync::{plan_sync, sync_events_from_calendly, SyncAction, SyncReport};
pub use webhook::{process_webhook, WebhookOutcome};
