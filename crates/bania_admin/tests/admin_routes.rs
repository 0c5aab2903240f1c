use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use bania_admin::{routes, AdminState};
use bania_calendly::models::CalendlyEventType;
use bania_calendly::{CalendlyError, EventTypeSource};
use bania_common::models::{Booking, BookingStatus, PaymentStatus};
use bania_common::services::ViewCache;
use bania_config::{AdminConfig, AppConfig, PhotoConfig};
use bania_db::{EventRepository, InMemoryStore, MemoryStorage};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "admin-secret";
const STORAGE_BASE: &str = "https://files.test/event-photos";

struct FixedCatalog(Vec<CalendlyEventType>);

#[async_trait]
impl EventTypeSource for FixedCatalog {
    async fn fetch_event_types(&self) -> Result<Vec<CalendlyEventType>, CalendlyError> {
        Ok(self.0.clone())
    }
}

struct TestApp {
    router: Router,
    store: Arc<InMemoryStore>,
    storage: Arc<MemoryStorage>,
}

fn config(secret: Option<&str>) -> Arc<AppConfig> {
    let mut config = AppConfig {
        admin: Some(AdminConfig {
            api_secret: secret.map(str::to_string),
        }),
        photo: PhotoConfig {
            resize: true,
            max_width: 64,
            max_height: 64,
            jpeg_quality: 80,
        },
        ..Default::default()
    };
    config.display.timezone = "UTC".to_string();
    Arc::new(config)
}

fn app_with(secret: Option<&str>, calendly: Option<Arc<dyn EventTypeSource>>) -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let storage = Arc::new(MemoryStorage::new(STORAGE_BASE));
    let router = routes(AdminState {
        config: config(secret),
        events: store.clone(),
        bookings: store.clone(),
        storage: storage.clone(),
        cache: Arc::new(ViewCache::new()),
        calendly,
    });
    TestApp {
        router,
        store,
        storage,
    }
}

fn app() -> TestApp {
    app_with(Some(SECRET), None)
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Admin-Secret", SECRET);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create(router: &Router, slug: &str) -> Uuid {
    let (status, body) = send(
        router,
        request(
            "POST",
            "/admin/events",
            Some(json!({
                "name": format!("Session {}", slug),
                "slug": slug,
                "duration": 120,
                "calendly_url": format!("https://calendly.com/bania/{}", slug),
                "price": 25.0
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["event"]["id"].as_str().unwrap().parse().unwrap()
}

async fn slugs(router: &Router) -> Vec<String> {
    let (status, body) = send(router, request("GET", "/admin/events", None)).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array()
        .unwrap()
        .iter()
        .map(|e| e["slug"].as_str().unwrap().to_string())
        .collect()
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(width, height, image::Rgb([10, 120, 200])))
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn multipart(event_id: Option<&str>, file: Option<&[u8]>) -> Request<Body> {
    const BOUNDARY: &str = "bania-test-boundary";
    let mut body = Vec::new();
    if let Some(id) = event_id {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"eventId\"\r\n\r\n{}\r\n",
                BOUNDARY, id
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"sauna.png\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/admin/upload")
        .header("X-Admin-Secret", SECRET)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn booking(start_in_hours: i64, payment: PaymentStatus, amount: Option<f64>) -> Booking {
    let start = Utc::now() + Duration::hours(start_in_hours);
    let id = Uuid::new_v4();
    Booking {
        id,
        calendly_event_uri: format!("https://api.calendly.com/scheduled_events/{}", id),
        calendly_invitee_uri: format!("https://api.calendly.com/scheduled_events/{}/invitees/1", id),
        event_type_name: "Banya 2h".into(),
        event_type_uuid: Some("ET1".into()),
        start_time: start,
        end_time: start + Duration::hours(2),
        invitee_name: "Olga Petrova".into(),
        invitee_email: Some("olga@example.com".into()),
        invitee_phone: Some("+7 900 111 22 33".into()),
        telegram_user_id: None,
        guests_count: 2,
        status: BookingStatus::Scheduled,
        payment_status: payment,
        payment_amount: amount,
        payment_notes: None,
        notes: None,
        calendly_payload: None,
        created_at: start,
        updated_at: start,
    }
}

// --- Auth ---

#[tokio::test]
async fn admin_secret_is_required() {
    let TestApp { router, .. } = app();

    let anonymous = Request::builder().uri("/admin/events").body(Body::empty()).unwrap();
    let (status, body) = send(&router, anonymous).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let wrong = Request::builder()
        .uri("/admin/events")
        .header("X-Admin-Secret", "nope")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&router, request("GET", "/admin/events", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_is_closed_without_configured_secret() {
    let TestApp { router, .. } = app_with(None, None);
    let (status, body) = send(&router, request("GET", "/admin/dashboard", None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}

// --- Events ---

#[tokio::test]
async fn created_events_show_up_in_cached_listing() {
    let TestApp { router, .. } = app();
    create(&router, "morning").await;
    assert_eq!(slugs(&router).await, vec!["morning"]);

    // The listing is cached; the next create must invalidate it.
    create(&router, "evening").await;
    assert_eq!(slugs(&router).await, vec!["morning", "evening"]);
}

#[tokio::test]
async fn create_rejects_missing_fields() {
    let TestApp { router, .. } = app();
    let (status, body) = send(
        &router,
        request(
            "POST",
            "/admin/events",
            Some(json!({ "name": "x", "slug": " ", "duration": 60, "calendly_url": "u" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("slug"));
}

#[tokio::test]
async fn update_toggle_and_delete() {
    let TestApp { router, store, .. } = app();
    let id = create(&router, "morning").await;

    let (status, body) = send(
        &router,
        request(
            "PATCH",
            &format!("/admin/events/{}", id),
            Some(json!({ "price": 40.0, "max_guests": 6 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["event"]["price"], 40.0);
    assert_eq!(body["event"]["max_guests"], 6);

    let (status, _) = send(
        &router,
        request("PATCH", &format!("/admin/events/{}", id), Some(json!({ "price": null }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.find_event(id).await.unwrap().unwrap().price, None);

    let (status, _) = send(
        &router,
        request("PATCH", &format!("/admin/events/{}", id), Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        request(
            "POST",
            &format!("/admin/events/{}/active", id),
            Some(json!({ "is_active": false })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["is_active"], false);

    let (status, _) = send(&router, request("DELETE", &format!("/admin/events/{}", id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(slugs(&router).await.is_empty());

    let (status, body) = send(&router, request("DELETE", &format!("/admin/events/{}", id), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn reorder_sets_positions() {
    let TestApp { router, .. } = app();
    let a = create(&router, "a").await;
    let b = create(&router, "b").await;
    let c = create(&router, "c").await;

    let (status, body) = send(
        &router,
        request("POST", "/admin/events/reorder", Some(json!({ "event_ids": [c, a, b] }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "updated": 3 }));
    assert_eq!(slugs(&router).await, vec!["c", "a", "b"]);

    let (status, body) = send(
        &router,
        request(
            "POST",
            "/admin/events/reorder",
            Some(json!({ "event_ids": [Uuid::new_v4(), c] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Failed to reorder some events" })
    );
}

#[tokio::test]
async fn sync_reports_counts() {
    let catalog = FixedCatalog(vec![CalendlyEventType {
        uri: "https://api.calendly.com/event_types/ET1".into(),
        name: "Banya 2h".into(),
        slug: "banya-2h".into(),
        scheduling_url: "https://calendly.com/bania/banya-2h".into(),
        duration: 120,
        description_plain: None,
        description_html: None,
        color: Some("#ff0000".into()),
        active: true,
    }]);
    let TestApp { router, .. } = app_with(Some(SECRET), Some(Arc::new(catalog)));
    assert!(slugs(&router).await.is_empty());

    let (status, body) = send(&router, request("POST", "/admin/events/sync", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "created": 1, "updated": 0, "deactivated": 0, "failed": 0 })
    );
    assert_eq!(slugs(&router).await, vec!["banya-2h"]);
}

#[tokio::test]
async fn sync_without_calendly_token_fails_softly() {
    let TestApp { router, .. } = app();
    let (status, body) = send(&router, request("POST", "/admin/events/sync", None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Calendly API token"));
}

// --- Photos ---

#[tokio::test]
async fn upload_stores_resized_photo_and_replaces_previous() {
    let TestApp { router, store, storage } = app();
    let id = create(&router, "morning").await;

    let (status, body) = send(&router, multipart(Some(&id.to_string()), Some(&png(200, 100)))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    let first_url = body["url"].as_str().unwrap().to_string();
    assert!(first_url.starts_with(&format!("{}/{}-", STORAGE_BASE, id)));
    assert!(first_url.ends_with(".jpg"));

    let first_file = first_url.rsplit('/').next().unwrap().to_string();
    let (bytes, content_type) = storage.get(&first_file).unwrap();
    assert_eq!(content_type, "image/jpeg");
    let stored = image::load_from_memory(&bytes).unwrap();
    assert_eq!((stored.width(), stored.height()), (64, 32));
    assert_eq!(
        store.find_event(id).await.unwrap().unwrap().photo_url.as_deref(),
        Some(first_url.as_str())
    );

    // Millisecond file names; make sure the second upload gets a new one.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let (status, body) = send(&router, multipart(Some(&id.to_string()), Some(&png(10, 10)))).await;
    assert_eq!(status, StatusCode::OK);
    let second_file = body["url"].as_str().unwrap().rsplit('/').next().unwrap().to_string();
    assert_eq!(storage.file_names(), vec![second_file]);
}

#[tokio::test]
async fn upload_requires_file_and_event_id() {
    let TestApp { router, .. } = app();
    let (status, body) = send(&router, multipart(None, Some(&png(4, 4)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Missing file or eventId" })
    );

    let (status, _) = send(&router, multipart(Some("not-a-uuid"), Some(&png(4, 4)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&router, multipart(Some(&Uuid::new_v4().to_string()), Some(&png(4, 4)))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn remove_photo_clears_url_and_file() {
    let TestApp { router, store, storage } = app();
    let id = create(&router, "morning").await;
    let (_, body) = send(&router, multipart(Some(&id.to_string()), Some(&png(8, 8)))).await;
    assert_eq!(body["success"], true);
    assert_eq!(storage.file_names().len(), 1);

    let (status, body) = send(&router, request("DELETE", &format!("/admin/events/{}/photo", id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["photo_url"], Value::Null);
    assert!(storage.file_names().is_empty());
    assert_eq!(store.find_event(id).await.unwrap().unwrap().photo_url, None);
}

// --- Bookings ---

#[tokio::test]
async fn bookings_listing_detail_and_payments() {
    let TestApp { router, store, .. } = app();
    let upcoming = booking(48, PaymentStatus::Pending, None);
    let past_paid = booking(-48, PaymentStatus::Paid, Some(30.0));
    store.seed_bookings(vec![upcoming.clone(), past_paid.clone()]).await;

    let (status, body) = send(&router, request("GET", "/admin/bookings?payment_status=paid", None)).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body.as_array().unwrap().iter().map(|b| b["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![past_paid.id.to_string()]);

    let (status, body) = send(&router, request("GET", "/admin/bookings?search=PETROVA&limit=1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], upcoming.id.to_string());

    let (status, body) = send(&router, request("GET", &format!("/admin/bookings/{}", upcoming.id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invitee_name"], "Olga Petrova");

    let (status, body) = send(&router, request("GET", &format!("/admin/bookings/{}", Uuid::new_v4()), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 404);

    let (status, _) = send(
        &router,
        request(
            "PATCH",
            &format!("/admin/bookings/{}/payment", upcoming.id),
            Some(json!({ "payment_status": "paid", "payment_amount": -5.0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        request(
            "PATCH",
            &format!("/admin/bookings/{}/payment", upcoming.id),
            Some(json!({ "payment_status": "refunded", "payment_amount": 25.0, "payment_notes": "cash" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["payment_status"], "refunded");
    assert_eq!(body["booking"]["payment_notes"], "cash");

    let (status, body) = send(
        &router,
        request("POST", &format!("/admin/bookings/{}/mark-paid", upcoming.id), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["payment_status"], "paid");
    assert_eq!(body["booking"]["payment_amount"], 25.0);
}

#[tokio::test]
async fn dashboard_counts_and_upcoming() {
    let TestApp { router, store, .. } = app();
    let mut cancelled = booking(72, PaymentStatus::Pending, None);
    cancelled.status = BookingStatus::Cancelled;
    store
        .seed_bookings(vec![
            booking(48, PaymentStatus::Pending, None),
            booking(24 * 7, PaymentStatus::Paid, Some(25.0)),
            booking(-48, PaymentStatus::Paid, Some(30.0)),
            cancelled,
        ])
        .await;

    let (status, body) = send(&router, request("GET", "/admin/dashboard", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upcoming_bookings"], 2);
    assert_eq!(body["pending_payments"], 1);
    assert_eq!(body["total_revenue"], 55.0);
    assert_eq!(body["today_bookings"], 0);

    let upcoming = body["upcoming"].as_array().unwrap();
    assert_eq!(upcoming.len(), 2);
    assert_eq!(upcoming[0]["payment_status"], "pending");
}
