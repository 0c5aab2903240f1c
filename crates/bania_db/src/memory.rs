//! In-memory store implementing both repository traits.
//!
//! Enforces the same uniqueness rules as the SQL schema (invitee uri on
//! bookings, Calendly event-type uri on events). The backend falls back to it
//! when no database url is configured, and tests use it directly.

use async_trait::async_trait;
use bania_common::models::{
    Booking, BookingFilter, BookingStatus, DashboardStats, Event, EventPatch, EventSyncFields,
    NewBooking, NewEvent, PaymentStatus, PaymentUpdate,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{BookingRepository, EventRepository};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    events: RwLock<Vec<Event>>,
    bookings: RwLock<Vec<Booking>>,
}

fn sort_by_display_order(events: &mut [Event]) {
    events.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then(a.created_at.cmp(&b.created_at))
    });
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn booking_count(&self) -> usize {
        self.bookings.read().await.len()
    }

    /// Replace all stored bookings. Handy for seeding dashboards in tests.
    pub async fn seed_bookings(&self, bookings: Vec<Booking>) {
        *self.bookings.write().await = bookings;
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn list_events(&self) -> Result<Vec<Event>, DbError> {
        let mut events = self.events.read().await.clone();
        sort_by_display_order(&mut events);
        Ok(events)
    }

    async fn list_active_events(&self) -> Result<Vec<Event>, DbError> {
        let mut events: Vec<Event> = self
            .events
            .read()
            .await
            .iter()
            .filter(|e| e.is_active)
            .cloned()
            .collect();
        sort_by_display_order(&mut events);
        Ok(events)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, DbError> {
        Ok(self.events.read().await.iter().find(|e| e.id == id).cloned())
    }

    async fn find_active_event_by_slug(&self, slug: &str) -> Result<Option<Event>, DbError> {
        let active = self.list_active_events().await?;
        Ok(active.into_iter().find(|e| e.slug == slug))
    }

    async fn insert_event(&self, event: NewEvent) -> Result<Event, DbError> {
        let mut events = self.events.write().await;
        if let Some(uri) = &event.calendly_event_uri {
            if events.iter().any(|e| e.calendly_event_uri.as_ref() == Some(uri)) {
                return Err(DbError::UniqueViolation(format!(
                    "events.calendly_event_uri {} already exists",
                    uri
                )));
            }
        }
        let display_order = event.display_order.unwrap_or_else(|| {
            events
                .iter()
                .map(|e| e.display_order)
                .max()
                .map_or(0, |max| max + 1)
        });
        let now = Utc::now();
        let stored = Event {
            id: Uuid::new_v4(),
            name: event.name,
            slug: event.slug,
            description_plain: event.description_plain,
            description_html: event.description_html,
            photo_url: event.photo_url,
            price: event.price,
            currency: event.currency,
            duration: event.duration,
            calendly_url: event.calendly_url,
            calendly_event_uri: event.calendly_event_uri,
            calendly_event_uuid: event.calendly_event_uuid,
            max_guests: event.max_guests,
            display_order,
            is_active: event.is_active,
            color: event.color,
            metadata: event.metadata,
            created_at: now,
            updated_at: now,
        };
        events.push(stored.clone());
        Ok(stored)
    }

    async fn update_event(&self, id: Uuid, patch: &EventPatch) -> Result<Option<Event>, DbError> {
        let mut events = self.events.write().await;
        Ok(events.iter_mut().find(|e| e.id == id).map(|event| {
            patch.apply(event);
            event.updated_at = Utc::now();
            event.clone()
        }))
    }

    async fn update_sync_fields(&self, id: Uuid, fields: &EventSyncFields) -> Result<bool, DbError> {
        let mut events = self.events.write().await;
        match events.iter_mut().find(|e| e.id == id) {
            Some(event) => {
                fields.apply(event);
                event.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_display_order(&self, id: Uuid, display_order: i32) -> Result<bool, DbError> {
        let mut events = self.events.write().await;
        match events.iter_mut().find(|e| e.id == id) {
            Some(event) => {
                event.display_order = display_order;
                event.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, DbError> {
        let mut events = self.events.write().await;
        let before = events.len();
        events.retain(|e| e.id != id);
        Ok(events.len() < before)
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, DbError> {
        let mut bookings = self.bookings.write().await;
        if bookings
            .iter()
            .any(|b| b.calendly_invitee_uri == booking.calendly_invitee_uri)
        {
            return Err(DbError::UniqueViolation(format!(
                "bookings.calendly_invitee_uri {} already exists",
                booking.calendly_invitee_uri
            )));
        }
        let now = Utc::now();
        let stored = Booking {
            id: Uuid::new_v4(),
            calendly_event_uri: booking.calendly_event_uri,
            calendly_invitee_uri: booking.calendly_invitee_uri,
            event_type_name: booking.event_type_name,
            event_type_uuid: booking.event_type_uuid,
            start_time: booking.start_time,
            end_time: booking.end_time,
            invitee_name: booking.invitee_name,
            invitee_email: booking.invitee_email,
            invitee_phone: booking.invitee_phone,
            telegram_user_id: booking.telegram_user_id,
            guests_count: booking.guests_count,
            status: BookingStatus::Scheduled,
            payment_status: PaymentStatus::Pending,
            payment_amount: None,
            payment_notes: None,
            notes: None,
            calendly_payload: Some(booking.calendly_payload),
            created_at: now,
            updated_at: now,
        };
        bookings.push(stored.clone());
        Ok(stored)
    }

    async fn cancel_booking(&self, invitee_uri: &str, payload: &Value) -> Result<u64, DbError> {
        let mut bookings = self.bookings.write().await;
        let mut changed = 0;
        for booking in bookings.iter_mut().filter(|b| b.calendly_invitee_uri == invitee_uri) {
            booking.status = BookingStatus::Cancelled;
            booking.calendly_payload = Some(payload.clone());
            booking.updated_at = Utc::now();
            changed += 1;
        }
        Ok(changed)
    }

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, DbError> {
        Ok(self.bookings.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, DbError> {
        let mut matching: Vec<Booking> = self
            .bookings
            .read()
            .await
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(matching
            .into_iter()
            .skip(filter.effective_offset() as usize)
            .take(filter.effective_limit() as usize)
            .collect())
    }

    async fn update_payment(&self, id: Uuid, update: &PaymentUpdate) -> Result<Option<Booking>, DbError> {
        let mut bookings = self.bookings.write().await;
        Ok(bookings.iter_mut().find(|b| b.id == id).map(|booking| {
            booking.payment_status = update.payment_status;
            booking.payment_amount = update.payment_amount;
            booking.payment_notes = update.payment_notes.clone();
            booking.updated_at = Utc::now();
            booking.clone()
        }))
    }

    async fn set_payment_status(&self, id: Uuid, status: PaymentStatus) -> Result<Option<Booking>, DbError> {
        let mut bookings = self.bookings.write().await;
        Ok(bookings.iter_mut().find(|b| b.id == id).map(|booking| {
            booking.payment_status = status;
            booking.updated_at = Utc::now();
            booking.clone()
        }))
    }

    async fn dashboard_stats(
        &self,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats, DbError> {
        let bookings = self.bookings.read().await;
        let scheduled = || bookings.iter().filter(|b| b.status == BookingStatus::Scheduled);
        Ok(DashboardStats {
            today_bookings: scheduled()
                .filter(|b| b.start_time >= day_start && b.start_time < day_end)
                .count() as i64,
            upcoming_bookings: scheduled().filter(|b| b.start_time >= now).count() as i64,
            pending_payments: scheduled()
                .filter(|b| b.payment_status == PaymentStatus::Pending)
                .count() as i64,
            total_revenue: bookings
                .iter()
                .filter(|b| b.payment_status == PaymentStatus::Paid)
                .filter_map(|b| b.payment_amount)
                .sum(),
        })
    }

    async fn upcoming_bookings(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<Booking>, DbError> {
        let mut upcoming: Vec<Booking> = self
            .bookings
            .read()
            .await
            .iter()
            .filter(|b| b.status == BookingStatus::Scheduled && b.start_time >= now)
            .cloned()
            .collect();
        upcoming.sort_by_key(|b| b.start_time);
        upcoming.truncate(limit.max(0) as usize);
        Ok(upcoming)
    }
}
