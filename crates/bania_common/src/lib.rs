pub mod error; // Error taxonomy
pub mod features; // Runtime integration checks
pub mod http; // Response helpers and the shared HTTP client
pub mod logging; // Subscriber setup
pub mod models; // Event and Booking records
pub mod services; // Injected service traits
pub mod time; // Display timezone

pub use error::{
    external_service_error, internal_error, not_found, validation_error, BaniaError,
    HttpStatusCode,
};

pub use http::{
    action_failure_body, action_success, client::{create_client, HTTP_CLIENT}, json_error,
    json_error_with_details, ActionFailure, API_PREFIX,
};

pub use models::{
    Booking, BookingFilter, BookingStatus, DashboardStats, Event, EventPatch, EventSyncFields,
    NewBooking, NewEvent, PaymentStatus, PaymentUpdate,
};

pub use services::{BoxFuture, NotificationService, ViewCache, ViewInvalidator};
