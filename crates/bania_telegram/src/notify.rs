//! Booking confirmations sent to the chat that booked through the Mini App.

use bania_common::models::Booking;
use bania_common::services::NotificationService;
use bania_common::{BaniaError, BoxFuture};
use chrono_tz::Tz;

use crate::client::TelegramClient;
use crate::models::SendMessage;

/// Confirmation text with the session time in `timezone`.
pub fn format_confirmation(booking: &Booking, timezone: Tz) -> String {
    let start = booking.start_time.with_timezone(&timezone);
    let end = booking.end_time.with_timezone(&timezone);
    let guests = if booking.guests_count == 1 {
        "1 guest".to_string()
    } else {
        format!("{} guests", booking.guests_count)
    };
    format!(
        "Your booking is confirmed!\n\n{}\n{}\n{} - {}\n{}\n\nSee you at the bania!",
        booking.event_type_name,
        start.format("%a, %b %-d"),
        start.format("%-I:%M %p"),
        end.format("%-I:%M %p"),
        guests,
    )
}

pub struct TelegramNotifier {
    client: TelegramClient,
    timezone: Tz,
}

impl TelegramNotifier {
    pub fn new(client: TelegramClient, timezone: Tz) -> Self {
        Self { client, timezone }
    }
}

impl NotificationService for TelegramNotifier {
    fn notify_booking_confirmed<'a>(
        &'a self,
        chat_id: i64,
        booking: &'a Booking,
    ) -> BoxFuture<'a, (), BaniaError> {
        Box::pin(async move {
            let message = SendMessage::text(chat_id, format_confirmation(booking, self.timezone));
            self.client.send_message(&message).await.map_err(BaniaError::from)
        })
    }
}
