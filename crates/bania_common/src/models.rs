//! Event and Booking records shared by the store, the webhook receivers and
//! the admin and Mini App surfaces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_CURRENCY: &str = "EUR";
pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

/// `utm_source` the Mini App sets on Calendly embeds; its `utm_content` is the
/// Telegram user id.
pub const TELEGRAM_UTM_SOURCE: &str = "telegram_miniapp";

// --- Status enums ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Scheduled,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(BookingStatus::Scheduled),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status '{}'", other)),
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("unknown payment status '{}'", other)),
        }
    }
}

// --- Events ---

/// A bookable session type mirrored from Calendly.
///
/// Calendly owns the scheduling fields (name, slug, duration, descriptions,
/// color, url). Price, photo, guest limit, order and the active flag belong to
/// the admin.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description_plain: Option<String>,
    pub description_html: Option<String>,
    pub photo_url: Option<String>,
    pub price: Option<f64>,
    pub currency: String,
    /// Minutes.
    pub duration: i32,
    pub calendly_url: String,
    pub calendly_event_uri: Option<String>,
    pub calendly_event_uuid: Option<String>,
    pub max_guests: Option<i32>,
    pub display_order: i32,
    pub is_active: bool,
    pub color: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_true() -> bool {
    true
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Input for creating an Event, by an admin or by the sync.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description_plain: Option<String>,
    #[serde(default)]
    pub description_html: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub duration: i32,
    pub calendly_url: String,
    #[serde(default)]
    pub calendly_event_uri: Option<String>,
    #[serde(default)]
    pub calendly_event_uuid: Option<String>,
    #[serde(default)]
    pub max_guests: Option<i32>,
    /// `None` appends after the current last event.
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "empty_object")]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub metadata: Value,
}

impl NewEvent {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if self.slug.trim().is_empty() {
            return Err("slug is required".to_string());
        }
        if self.calendly_url.trim().is_empty() {
            return Err("calendly_url is required".to_string());
        }
        if self.duration <= 0 {
            return Err("duration must be positive".to_string());
        }
        if self.price.is_some_and(|p| p < 0.0) {
            return Err("price must not be negative".to_string());
        }
        Ok(())
    }
}

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update of an Event. Nullable columns use `Option<Option<_>>` so that
/// `{"price": null}` clears the price while a missing key leaves it alone.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description_plain: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description_html: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub photo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub price: Option<Option<f64>>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub calendly_url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub max_guests: Option<Option<i32>>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub color: Option<Option<String>>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub metadata: Option<Value>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self == &EventPatch::default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err("name must not be empty".to_string());
        }
        if self.slug.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err("slug must not be empty".to_string());
        }
        if self.duration.is_some_and(|d| d <= 0) {
            return Err("duration must be positive".to_string());
        }
        if let Some(Some(price)) = self.price {
            if price < 0.0 {
                return Err("price must not be negative".to_string());
            }
        }
        Ok(())
    }

    /// Applies the patch to an in-memory record.
    pub fn apply(&self, event: &mut Event) {
        if let Some(v) = &self.name {
            event.name = v.clone();
        }
        if let Some(v) = &self.slug {
            event.slug = v.clone();
        }
        if let Some(v) = &self.description_plain {
            event.description_plain = v.clone();
        }
        if let Some(v) = &self.description_html {
            event.description_html = v.clone();
        }
        if let Some(v) = &self.photo_url {
            event.photo_url = v.clone();
        }
        if let Some(v) = self.price {
            event.price = v;
        }
        if let Some(v) = &self.currency {
            event.currency = v.clone();
        }
        if let Some(v) = self.duration {
            event.duration = v;
        }
        if let Some(v) = &self.calendly_url {
            event.calendly_url = v.clone();
        }
        if let Some(v) = self.max_guests {
            event.max_guests = v;
        }
        if let Some(v) = self.display_order {
            event.display_order = v;
        }
        if let Some(v) = self.is_active {
            event.is_active = v;
        }
        if let Some(v) = &self.color {
            event.color = v.clone();
        }
        if let Some(v) = &self.metadata {
            event.metadata = v.clone();
        }
    }
}

/// The Calendly-owned columns written by the sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSyncFields {
    pub name: String,
    pub slug: String,
    pub duration: i32,
    pub description_plain: Option<String>,
    pub description_html: Option<String>,
    pub calendly_url: String,
    pub calendly_event_uri: String,
    pub calendly_event_uuid: String,
    pub color: Option<String>,
}

impl EventSyncFields {
    pub fn apply(&self, event: &mut Event) {
        event.name = self.name.clone();
        event.slug = self.slug.clone();
        event.duration = self.duration;
        event.description_plain = self.description_plain.clone();
        event.description_html = self.description_html.clone();
        event.calendly_url = self.calendly_url.clone();
        event.calendly_event_uri = Some(self.calendly_event_uri.clone());
        event.calendly_event_uuid = Some(self.calendly_event_uuid.clone());
        event.color = self.color.clone();
    }

    /// A new active Event placed after the current last one.
    pub fn into_new_event(self) -> NewEvent {
        NewEvent {
            name: self.name,
            slug: self.slug,
            description_plain: self.description_plain,
            description_html: self.description_html,
            photo_url: None,
            price: None,
            currency: default_currency(),
            duration: self.duration,
            calendly_url: self.calendly_url,
            calendly_event_uri: Some(self.calendly_event_uri),
            calendly_event_uuid: Some(self.calendly_event_uuid),
            max_guests: None,
            display_order: None,
            is_active: true,
            color: self.color,
            metadata: empty_object(),
        }
    }
}

// --- Bookings ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub calendly_event_uri: String,
    pub calendly_invitee_uri: String,
    pub event_type_name: String,
    pub event_type_uuid: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub invitee_name: String,
    pub invitee_email: Option<String>,
    pub invitee_phone: Option<String>,
    pub telegram_user_id: Option<i64>,
    pub guests_count: i32,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_amount: Option<f64>,
    pub payment_notes: Option<String>,
    pub notes: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub calendly_payload: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// A booking as created by the `invitee.created` webhook. Status starts at
/// `scheduled` and payment at `pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub calendly_event_uri: String,
    pub calendly_invitee_uri: String,
    pub event_type_name: String,
    pub event_type_uuid: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub invitee_name: String,
    pub invitee_email: Option<String>,
    pub invitee_phone: Option<String>,
    pub telegram_user_id: Option<i64>,
    pub guests_count: i32,
    pub calendly_payload: Value,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentUpdate {
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_amount: Option<f64>,
    #[serde(default)]
    pub payment_notes: Option<String>,
}

impl PaymentUpdate {
    pub fn validate(&self) -> Result<(), String> {
        match self.payment_amount {
            Some(amount) if amount < 0.0 || !amount.is_finite() => {
                Err("payment_amount must be a non-negative number".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Filters for the admin bookings listing.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingFilter {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    /// Case-insensitive substring over invitee name, email and phone.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

impl BookingFilter {
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Trimmed, non-empty search term.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Whether a booking passes every filter except paging.
    pub fn matches(&self, booking: &Booking) -> bool {
        if self.status.is_some_and(|s| s != booking.status) {
            return false;
        }
        if self.payment_status.is_some_and(|p| p != booking.payment_status) {
            return false;
        }
        if self.from.is_some_and(|from| booking.start_time < from) {
            return false;
        }
        if self.to.is_some_and(|to| booking.start_time > to) {
            return false;
        }
        match self.search_term() {
            None => true,
            Some(term) => {
                let needle = term.to_lowercase();
                let hit = |field: Option<&str>| {
                    field.is_some_and(|f| f.to_lowercase().contains(&needle))
                };
                hit(Some(&booking.invitee_name))
                    || hit(booking.invitee_email.as_deref())
                    || hit(booking.invitee_phone.as_deref())
            }
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub today_bookings: i64,
    pub upcoming_bookings: i64,
    pub pending_payments: i64,
    pub total_revenue: f64,
}
