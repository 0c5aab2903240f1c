//! Calendly wire types: webhook payloads and API v2 event types.

use bania_common::models::EventSyncFields;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- Webhook payloads ---

/// A webhook delivery, tagged by its `event` field.
///
/// Anything that is not one of these three event names, or whose `payload`
/// does not fit the variant, fails to deserialize and is rejected as an
/// invalid payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum WebhookEvent {
    #[serde(rename = "invitee.created")]
    InviteeCreated(InviteePayload),
    #[serde(rename = "invitee.canceled")]
    InviteeCanceled(InviteePayload),
    #[serde(rename = "routing_form_submission.created")]
    RoutingFormSubmissionCreated(Value),
}

impl WebhookEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WebhookEvent::InviteeCreated(_) => "invitee.created",
            WebhookEvent::InviteeCanceled(_) => "invitee.canceled",
            WebhookEvent::RoutingFormSubmissionCreated(_) => "routing_form_submission.created",
        }
    }

    /// Checks the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            WebhookEvent::InviteeCreated(p) | WebhookEvent::InviteeCanceled(p) => p.validate(),
            WebhookEvent::RoutingFormSubmissionCreated(_) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendlyStatus {
    Active,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteePayload {
    /// Invitee uri, unique per booking.
    pub uri: String,
    pub name: String,
    pub email: String,
    /// Scheduled event uri.
    pub event: String,
    pub status: CalendlyStatus,
    pub timezone: String,
    pub created_at: String,
    pub updated_at: String,
    pub cancel_url: String,
    pub reschedule_url: String,
    #[serde(default)]
    pub questions_and_answers: Vec<QuestionAndAnswer>,
    pub scheduled_event: ScheduledEvent,
    #[serde(default)]
    pub tracking: Option<Tracking>,
}

impl InviteePayload {
    pub fn validate(&self) -> Result<(), String> {
        if self.uri.trim().is_empty() {
            return Err("payload.uri: required".to_string());
        }
        if !is_plausible_email(&self.email) {
            return Err("payload.email: Invalid email".to_string());
        }
        if self.scheduled_event.end_time < self.scheduled_event.start_time {
            return Err("payload.scheduled_event: end_time is before start_time".to_string());
        }
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAndAnswer {
    pub question: String,
    pub answer: String,
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub uri: String,
    pub name: String,
    pub status: CalendlyStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Event type uri.
    pub event_type: String,
    #[serde(default)]
    pub location: Option<EventLocation>,
    pub invitees_counter: InviteesCounter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLocation {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteesCounter {
    pub total: i64,
    pub active: i64,
    pub limit: i64,
}

/// UTM parameters Calendly carries over from the scheduling link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tracking {
    #[serde(default)]
    pub utm_source: Option<String>,
    #[serde(default)]
    pub utm_medium: Option<String>,
    #[serde(default)]
    pub utm_campaign: Option<String>,
    #[serde(default)]
    pub utm_content: Option<String>,
    #[serde(default)]
    pub utm_term: Option<String>,
    #[serde(default)]
    pub salesforce_uuid: Option<String>,
}

// --- API v2 ---

#[derive(Debug, Deserialize)]
pub struct CurrentUserResponse {
    pub resource: CurrentUser,
}

#[derive(Debug, Deserialize)]
pub struct CurrentUser {
    pub uri: String,
}

#[derive(Debug, Deserialize)]
pub struct EventTypesPage {
    #[serde(default)]
    pub collection: Vec<CalendlyEventType>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub next_page: Option<String>,
}

/// An event type as listed by `GET /event_types`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendlyEventType {
    pub uri: String,
    pub name: String,
    pub slug: String,
    pub scheduling_url: String,
    /// Minutes.
    pub duration: i32,
    #[serde(default)]
    pub description_plain: Option<String>,
    #[serde(default)]
    pub description_html: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl CalendlyEventType {
    /// Last path segment of the uri.
    pub fn uuid(&self) -> &str {
        self.uri
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }

    pub fn to_sync_fields(&self) -> EventSyncFields {
        EventSyncFields {
            name: self.name.clone(),
            slug: self.slug.clone(),
            duration: self.duration,
            description_plain: non_blank(&self.description_plain),
            description_html: non_blank(&self.description_html),
            calendly_url: self.scheduling_url.clone(),
            calendly_event_uri: self.uri.clone(),
            calendly_event_uuid: self.uuid().to_string(),
            color: self.color.clone(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}
