use bania_calendly::client::MAX_PAGES;
use bania_calendly::{sync_events_from_calendly, CalendlyClient, CalendlyError, EventTypeSource};
use bania_common::services::ViewCache;
use bania_config::CalendlyConfig;
use bania_db::{EventRepository, InMemoryStore};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> CalendlyClient {
    CalendlyClient::new(&CalendlyConfig {
        api_token: Some("token".into()),
        api_base_url: server.uri(),
        ..Default::default()
    })
    .unwrap()
}

fn event_type(id: &str, name: &str) -> serde_json::Value {
    json!({
        "uri": format!("https://api.calendly.com/event_types/{}", id),
        "name": name,
        "slug": name.to_lowercase(),
        "scheduling_url": format!("https://calendly.com/bania/{}", name.to_lowercase()),
        "duration": 90,
        "description_plain": "Hot",
        "description_html": "<p>Hot</p>",
        "color": "#ff9900",
        "active": true
    })
}

async fn mount_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resource": { "uri": "https://api.calendly.com/users/U1" }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn follows_pagination() {
    let server = MockServer::start().await;
    mount_user(&server).await;

    Mock::given(method("GET"))
        .and(path("/event_types"))
        .and(query_param("user", "https://api.calendly.com/users/U1"))
        .and(query_param("count", "100"))
        .and(query_param("active", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collection": [event_type("A", "Alpha")],
            "pagination": { "next_page": format!("{}/event_types/page2", server.uri()) }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/event_types/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collection": [event_type("B", "Beta")],
            "pagination": { "next_page": null }
        })))
        .mount(&server)
        .await;

    let types = client(&server).fetch_event_types().await.unwrap();
    let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);
}

#[tokio::test]
async fn endless_pagination_is_an_error() {
    let server = MockServer::start().await;
    mount_user(&server).await;

    Mock::given(method("GET"))
        .and(path("/event_types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collection": [event_type("A", "Alpha")],
            "pagination": { "next_page": format!("{}/event_types?page_token=again", server.uri()) }
        })))
        .expect(MAX_PAGES as u64)
        .mount(&server)
        .await;

    let err = client(&server).fetch_event_types().await.unwrap_err();
    assert!(matches!(err, CalendlyError::TooManyPages(n) if n == MAX_PAGES));
}

#[tokio::test]
async fn user_lookup_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "title": "Unauthenticated" })))
        .mount(&server)
        .await;

    let err = client(&server).fetch_event_types().await.unwrap_err();
    assert!(matches!(err, CalendlyError::ApiError { status: 401, .. }));
    assert_eq!(err.to_string(), "Calendly API error: 401");
}

#[tokio::test]
async fn event_types_failure_is_reported() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    Mock::given(method("GET"))
        .and(path("/event_types"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).fetch_event_types().await.unwrap_err();
    assert_eq!(err.to_string(), "Calendly event_types error: 500");
}

#[tokio::test]
async fn sync_against_mock_api() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    Mock::given(method("GET"))
        .and(path("/event_types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collection": [event_type("A", "Alpha"), event_type("B", "Beta")],
            "pagination": {}
        })))
        .mount(&server)
        .await;

    let store = InMemoryStore::new();
    let cache = ViewCache::new();
    let report = sync_events_from_calendly(&client(&server), &store, &cache).await.unwrap();
    assert_eq!(report.created, 2);

    let events = store.list_active_events().await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].display_order, 0);
    assert_eq!(events[1].display_order, 1);
    assert_eq!(events[0].description_html.as_deref(), Some("<p>Hot</p>"));
    assert_eq!(events[0].currency, "EUR");
}
