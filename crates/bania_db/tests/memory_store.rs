use bania_common::models::{
    BookingFilter, BookingStatus, EventPatch, EventSyncFields, NewBooking, NewEvent,
    PaymentStatus, PaymentUpdate,
};
use bania_db::{BookingRepository, EventRepository, InMemoryStore};
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

fn new_event(slug: &str, uri: Option<&str>) -> NewEvent {
    serde_json::from_value(json!({
        "name": format!("Session {}", slug),
        "slug": slug,
        "duration": 120,
        "calendly_url": format!("https://calendly.com/bania/{}", slug),
        "calendly_event_uri": uri,
    }))
    .unwrap()
}

fn new_booking(invitee: &str, name: &str, hours_from_base: i64) -> NewBooking {
    let start = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap() + Duration::hours(hours_from_base);
    NewBooking {
        calendly_event_uri: "https://api.calendly.com/scheduled_events/EV".into(),
        calendly_invitee_uri: invitee.into(),
        event_type_name: "Banya".into(),
        event_type_uuid: None,
        start_time: start,
        end_time: start + Duration::hours(2),
        invitee_name: name.into(),
        invitee_email: Some(format!("{}@example.com", name.to_lowercase())),
        invitee_phone: None,
        telegram_user_id: None,
        guests_count: 1,
        calendly_payload: json!({ "event": "invitee.created" }),
    }
}

#[tokio::test]
async fn events_get_next_display_order() {
    let store = InMemoryStore::new();
    let a = store.insert_event(new_event("a", None)).await.unwrap();
    let b = store.insert_event(new_event("b", None)).await.unwrap();
    assert_eq!(a.display_order, 0);
    assert_eq!(b.display_order, 1);

    let mut explicit = new_event("c", None);
    explicit.display_order = Some(10);
    store.insert_event(explicit).await.unwrap();
    let d = store.insert_event(new_event("d", None)).await.unwrap();
    assert_eq!(d.display_order, 11);
}

#[tokio::test]
async fn duplicate_calendly_uri_is_rejected() {
    let store = InMemoryStore::new();
    store.insert_event(new_event("a", Some("uri/A"))).await.unwrap();
    let err = store.insert_event(new_event("a2", Some("uri/A"))).await.unwrap_err();
    assert!(err.is_unique_violation());
}

#[tokio::test]
async fn patch_and_sync_fields_touch_separate_columns() {
    let store = InMemoryStore::new();
    let ev = store.insert_event(new_event("a", Some("uri/A"))).await.unwrap();

    let patch: EventPatch = serde_json::from_value(json!({ "price": 25.0, "max_guests": 6 })).unwrap();
    store.update_event(ev.id, &patch).await.unwrap().unwrap();

    let fields = EventSyncFields {
        name: "Renamed".into(),
        slug: "renamed".into(),
        duration: 90,
        description_plain: None,
        description_html: None,
        calendly_url: "https://calendly.com/bania/renamed".into(),
        calendly_event_uri: "uri/A".into(),
        calendly_event_uuid: "A".into(),
        color: Some("#ff0000".into()),
    };
    assert!(store.update_sync_fields(ev.id, &fields).await.unwrap());

    let stored = store.find_event(ev.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Renamed");
    assert_eq!(stored.price, Some(25.0));
    assert_eq!(stored.max_guests, Some(6));
}

#[tokio::test]
async fn slug_lookup_ignores_inactive_events() {
    let store = InMemoryStore::new();
    let ev = store.insert_event(new_event("hidden", None)).await.unwrap();
    let patch = EventPatch { is_active: Some(false), ..Default::default() };
    store.update_event(ev.id, &patch).await.unwrap();

    assert!(store.find_active_event_by_slug("hidden").await.unwrap().is_none());
    assert!(store.list_active_events().await.unwrap().is_empty());
    assert_eq!(store.list_events().await.unwrap().len(), 1);
}

#[tokio::test]
async fn same_invitee_is_stored_once() {
    let store = InMemoryStore::new();
    store.insert_booking(new_booking("inv/1", "Anna", 0)).await.unwrap();
    let err = store.insert_booking(new_booking("inv/1", "Anna", 0)).await.unwrap_err();
    assert!(err.is_unique_violation());
    assert_eq!(store.booking_count().await, 1);
}

#[tokio::test]
async fn cancel_updates_status_and_payload() {
    let store = InMemoryStore::new();
    let booking = store.insert_booking(new_booking("inv/1", "Anna", 0)).await.unwrap();

    let changed = store
        .cancel_booking("inv/1", &json!({ "event": "invitee.canceled" }))
        .await
        .unwrap();
    assert_eq!(changed, 1);
    assert_eq!(store.cancel_booking("inv/unknown", &json!({})).await.unwrap(), 0);

    let stored = store.find_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);
    assert_eq!(stored.calendly_payload, Some(json!({ "event": "invitee.canceled" })));
}

#[tokio::test]
async fn listing_filters_and_orders_newest_first() {
    let store = InMemoryStore::new();
    let anna = store.insert_booking(new_booking("inv/1", "Anna", 0)).await.unwrap();
    store.insert_booking(new_booking("inv/2", "Boris", 24)).await.unwrap();
    store.insert_booking(new_booking("inv/3", "Anastasia", 48)).await.unwrap();

    let update = PaymentUpdate {
        payment_status: PaymentStatus::Paid,
        payment_amount: Some(40.0),
        payment_notes: Some("cash".into()),
    };
    store.update_payment(anna.id, &update).await.unwrap();

    let all = store.list_bookings(&BookingFilter::default()).await.unwrap();
    let names: Vec<_> = all.iter().map(|b| b.invitee_name.as_str()).collect();
    assert_eq!(names, vec!["Anastasia", "Boris", "Anna"]);

    let search = BookingFilter { search: Some("ana".into()), ..Default::default() };
    assert_eq!(store.list_bookings(&search).await.unwrap().len(), 1);

    let paid = BookingFilter { payment_status: Some(PaymentStatus::Paid), ..Default::default() };
    let paid = store.list_bookings(&paid).await.unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].payment_notes.as_deref(), Some("cash"));

    let page = BookingFilter { limit: Some(1), offset: Some(1), ..Default::default() };
    assert_eq!(store.list_bookings(&page).await.unwrap()[0].invitee_name, "Boris");
}

#[tokio::test]
async fn dashboard_counts_scheduled_bookings() {
    let store = InMemoryStore::new();
    let day_start = Utc.with_ymd_and_hms(2026, 5, 10, 0, 0, 0).unwrap();
    let day_end = day_start + Duration::days(1);
    let now = Utc.with_ymd_and_hms(2026, 5, 10, 9, 0, 0).unwrap();

    let today = store.insert_booking(new_booking("inv/1", "Anna", 0)).await.unwrap();
    store.insert_booking(new_booking("inv/2", "Boris", 24)).await.unwrap();
    store.insert_booking(new_booking("inv/3", "Vera", 30)).await.unwrap();
    store.cancel_booking("inv/3", &json!({})).await.unwrap();
    store
        .update_payment(
            today.id,
            &PaymentUpdate { payment_status: PaymentStatus::Paid, payment_amount: Some(50.0), payment_notes: None },
        )
        .await
        .unwrap();

    let stats = store.dashboard_stats(day_start, day_end, now).await.unwrap();
    assert_eq!(stats.today_bookings, 1);
    assert_eq!(stats.upcoming_bookings, 2);
    assert_eq!(stats.pending_payments, 1);
    assert_eq!(stats.total_revenue, 50.0);

    let upcoming = store.upcoming_bookings(now, 10).await.unwrap();
    assert_eq!(upcoming.len(), 2);
    assert_eq!(upcoming[0].invitee_name, "Anna");
}
