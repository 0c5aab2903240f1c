use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use bania_common::models::{EventPatch, NewEvent};
use bania_common::services::{ViewCache, ViewInvalidator, ACTIVE_EVENTS_VIEW, EVENTS_VIEW};
use bania_db::{EventRepository, InMemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn new_event(slug: &str, order: i32, active: bool) -> NewEvent {
    serde_json::from_value(json!({
        "name": format!("Banya {}", slug),
        "slug": slug,
        "duration": 120,
        "price": 75.0,
        "max_guests": 6,
        "calendly_url": format!("https://calendly.com/bania/{}", slug),
        "display_order": order,
        "is_active": active,
    }))
    .unwrap()
}

async fn setup() -> (Router, Arc<InMemoryStore>, Arc<ViewCache>) {
    let store = Arc::new(InMemoryStore::new());
    store.insert_event(new_event("evening", 1, true)).await.unwrap();
    store.insert_event(new_event("morning", 0, true)).await.unwrap();
    store.insert_event(new_event("hidden", 2, false)).await.unwrap();
    let cache = Arc::new(ViewCache::new());
    let router = bania_miniapp::routes(store.clone(), cache.clone());
    (router, store, cache)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn lists_active_events_in_display_order() {
    let (router, _, _) = setup().await;

    let (status, body) = get(&router, "/miniapp/events").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    let slugs: Vec<&str> = body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["morning", "evening"]);
    assert_eq!(body["events"][0]["price_label"], "€75");
    assert_eq!(body["events"][0]["duration_label"], "2 hours");
    assert_eq!(body["events"][0]["guests_label"], "up to 6 guests");
}

#[tokio::test]
async fn active_listing_is_cached_until_events_change() {
    let (router, store, cache) = setup().await;
    get(&router, "/miniapp/events").await;
    assert!(cache.get(ACTIVE_EVENTS_VIEW).is_some());

    let morning = store.list_events().await.unwrap().into_iter().find(|e| e.slug == "morning").unwrap();
    let patch: EventPatch = serde_json::from_value(json!({ "is_active": false })).unwrap();
    store.update_event(morning.id, &patch).await.unwrap();

    let (_, stale) = get(&router, "/miniapp/events").await;
    assert!(stale.contains("\"morning\""));

    cache.invalidate(EVENTS_VIEW);
    let (_, fresh) = get(&router, "/miniapp/events").await;
    assert!(!fresh.contains("\"morning\""));
    assert!(fresh.contains("\"evening\""));
}

#[tokio::test]
async fn event_detail_carries_embed_url() {
    let (router, _, _) = setup().await;

    let (status, body) = get(&router, "/miniapp/events/morning?tg_user_id=12345&name=Olga").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["event"]["slug"], "morning");
    assert_eq!(
        body["embed_url"],
        "https://calendly.com/bania/morning?hide_gdpr_banner=1&hide_landing_page_details=1\
         &utm_source=telegram_miniapp&utm_content=12345&name=Olga"
    );
}

#[tokio::test]
async fn inactive_or_unknown_event_is_not_found() {
    let (router, _, _) = setup().await;
    let (status, _) = get(&router, "/miniapp/events/hidden").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = get(&router, "/miniapp/events/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"]["code"], 404);
}

#[tokio::test]
async fn list_page_links_to_booking_pages() {
    let (router, _, _) = setup().await;
    let (status, html) = get(&router, "/miniapp").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Banya Portugal"));
    assert!(html.contains(r#"href="/api/miniapp/book/morning""#));
    assert!(html.contains(r#"href="/api/miniapp/book/evening""#));
    assert!(!html.contains("/api/miniapp/book/hidden"));
    assert!(html.find("book/morning").unwrap() < html.find("book/evening").unwrap());
}

#[tokio::test]
async fn empty_catalog_page() {
    let router = bania_miniapp::routes(Arc::new(InMemoryStore::new()), Arc::new(ViewCache::new()));
    let (status, html) = get(&router, "/miniapp").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No events available"));
}

#[tokio::test]
async fn booking_page_embeds_calendly() {
    let (router, _, _) = setup().await;
    let (status, html) = get(&router, "/miniapp/book/evening?tg_user_id=7").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("calendly-inline-widget"));
    assert!(html.contains("utm_source=telegram_miniapp&amp;utm_content=7"));

    let (status, html) = get(&router, "/miniapp/book/hidden").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("Event not found"));
    assert!(html.contains(r#"href="/api/miniapp""#));
}
