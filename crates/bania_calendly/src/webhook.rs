//! Booking state changes driven by Calendly webhook deliveries.

use bania_common::models::{Booking, NewBooking};
use bania_common::services::NotificationService;
use bania_db::{BookingRepository, DbError};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::CalendlyError;
use crate::extract::{extract_guests_count, extract_phone, extract_telegram_user_id};
use crate::models::{InviteePayload, WebhookEvent};

/// Bound on the confirmation message round trip.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Created(Booking),
    /// The invitee uri was already stored; nothing changed.
    Duplicate,
    Cancelled,
    /// A cancellation for an invitee we never stored.
    CancelNotFound,
    /// An event kind that needs no action.
    Ignored,
}

/// The row an `invitee.created` delivery becomes. `raw` is stored verbatim.
pub fn booking_from_payload(payload: &InviteePayload, raw: Value) -> NewBooking {
    NewBooking {
        calendly_event_uri: payload.event.clone(),
        calendly_invitee_uri: payload.uri.clone(),
        event_type_name: payload.scheduled_event.name.clone(),
        event_type_uuid: Some(payload.scheduled_event.event_type.clone()),
        start_time: payload.scheduled_event.start_time,
        end_time: payload.scheduled_event.end_time,
        invitee_name: payload.name.clone(),
        invitee_email: Some(payload.email.clone()),
        invitee_phone: extract_phone(&payload.questions_and_answers),
        telegram_user_id: extract_telegram_user_id(payload.tracking.as_ref()),
        guests_count: extract_guests_count(&payload.questions_and_answers),
        calendly_payload: raw,
    }
}

/// Applies a validated delivery to the booking store.
///
/// Store failures are returned. Notification failures never are: they are
/// logged and the outcome is still `Created`.
pub async fn process_webhook(
    event: WebhookEvent,
    raw: Value,
    bookings: &dyn BookingRepository,
    notifier: Option<&Arc<dyn NotificationService>>,
) -> Result<WebhookOutcome, CalendlyError> {
    match event {
        WebhookEvent::InviteeCreated(payload) => {
            let new_booking = booking_from_payload(&payload, raw);
            let booking = match bookings.insert_booking(new_booking).await {
                Ok(booking) => booking,
                Err(DbError::UniqueViolation(_)) => {
                    warn!("Duplicate delivery for invitee {}, already processed", payload.uri);
                    return Ok(WebhookOutcome::Duplicate);
                }
                Err(e) => return Err(e.into()),
            };
            info!(
                "Booking created: {} - {}",
                booking.invitee_name, booking.event_type_name
            );

            if let (Some(chat_id), Some(notifier)) = (booking.telegram_user_id, notifier) {
                notify_confirmed(&**notifier, chat_id, &booking).await;
            }
            Ok(WebhookOutcome::Created(booking))
        }
        WebhookEvent::InviteeCanceled(payload) => {
            let changed = bookings.cancel_booking(&payload.uri, &raw).await?;
            if changed == 0 {
                warn!("Cancellation for unknown invitee {}", payload.uri);
                Ok(WebhookOutcome::CancelNotFound)
            } else {
                info!("Booking cancelled: {}", payload.name);
                Ok(WebhookOutcome::Cancelled)
            }
        }
        WebhookEvent::RoutingFormSubmissionCreated(_) => {
            info!("Ignoring routing_form_submission.created");
            Ok(WebhookOutcome::Ignored)
        }
    }
}

async fn notify_confirmed(notifier: &dyn NotificationService, chat_id: i64, booking: &Booking) {
    match tokio::time::timeout(NOTIFY_TIMEOUT, notifier.notify_booking_confirmed(chat_id, booking)).await {
        Ok(Ok(())) => info!("Sent booking confirmation to chat {}", chat_id),
        Ok(Err(e)) => warn!("Booking confirmation to chat {} failed: {}", chat_id, e),
        Err(_) => warn!("Booking confirmation to chat {} timed out", chat_id),
    }
}
