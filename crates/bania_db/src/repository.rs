//! Repository traits for the Event and Booking tables.
//!
//! Both the Postgres repositories and the in-memory store implement these, and
//! services hold them as `Arc<dyn EventRepository>` / `Arc<dyn BookingRepository>`.

use async_trait::async_trait;
use bania_common::models::{
    Booking, BookingFilter, DashboardStats, Event, EventPatch, EventSyncFields, NewBooking,
    NewEvent, PaymentStatus, PaymentUpdate,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::error::DbError;

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// All events ordered by `display_order`.
    async fn list_events(&self) -> Result<Vec<Event>, DbError>;

    /// Active events ordered by `display_order`.
    async fn list_active_events(&self) -> Result<Vec<Event>, DbError>;

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, DbError>;

    /// First active event with this slug.
    async fn find_active_event_by_slug(&self, slug: &str) -> Result<Option<Event>, DbError>;

    /// Inserts an event. `display_order = None` places it after the current last event.
    async fn insert_event(&self, event: NewEvent) -> Result<Event, DbError>;

    /// Applies a partial update. Returns `None` when no event has this id.
    async fn update_event(&self, id: Uuid, patch: &EventPatch) -> Result<Option<Event>, DbError>;

    /// Overwrites only the Calendly-owned columns. Returns whether a row matched.
    async fn update_sync_fields(&self, id: Uuid, fields: &EventSyncFields) -> Result<bool, DbError>;

    async fn set_display_order(&self, id: Uuid, display_order: i32) -> Result<bool, DbError>;

    async fn delete_event(&self, id: Uuid) -> Result<bool, DbError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts a scheduled, payment-pending booking.
    ///
    /// A second insert with the same `calendly_invitee_uri` fails with
    /// [`DbError::UniqueViolation`].
    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, DbError>;

    /// Marks the booking with this invitee uri as cancelled and stores the new
    /// payload. Returns the number of rows changed (0 or 1).
    async fn cancel_booking(&self, invitee_uri: &str, payload: &Value) -> Result<u64, DbError>;

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, DbError>;

    /// Filtered listing, newest `start_time` first.
    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, DbError>;

    async fn update_payment(&self, id: Uuid, update: &PaymentUpdate) -> Result<Option<Booking>, DbError>;

    async fn set_payment_status(&self, id: Uuid, status: PaymentStatus) -> Result<Option<Booking>, DbError>;

    /// Counters for the admin dashboard. `[day_start, day_end)` is "today" in
    /// the display timezone.
    async fn dashboard_stats(
        &self,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats, DbError>;

    /// Scheduled bookings starting at or after `now`, soonest first.
    async fn upcoming_bookings(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<Booking>, DbError>;
}
