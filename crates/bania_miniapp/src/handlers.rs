use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use bania_common::services::{ViewCache, ACTIVE_EVENTS_VIEW};
use bania_common::{not_found, BaniaError, API_PREFIX};
use bania_db::EventRepository;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::logic::{build_embed_url, EmbedQuery, EventDetail, MiniAppEvent};
use crate::render::{render_booking_page, render_event_list, render_not_found, render_unavailable};

// --- State for Mini App Handlers ---
pub struct MiniAppState {
    pub events: Arc<dyn EventRepository>,
    /// Shared with the admin router, which drops the active listing on every event mutation.
    pub cache: Arc<ViewCache>,
}

impl MiniAppState {
    /// Active events by display order, served from the view cache when warm.
    async fn active_events(&self) -> Result<Vec<MiniAppEvent>, BaniaError> {
        if let Some(hit) = self.cache.get(ACTIVE_EVENTS_VIEW) {
            debug!("Serving active events from view cache");
            return Ok(serde_json::from_value(hit)?);
        }
        let events: Vec<MiniAppEvent> = self
            .events
            .list_active_events()
            .await?
            .iter()
            .map(MiniAppEvent::from)
            .collect();
        self.cache
            .put(ACTIVE_EVENTS_VIEW, serde_json::to_value(&events)?);
        Ok(events)
    }

    async fn event_detail(
        &self,
        slug: &str,
        query: &EmbedQuery,
    ) -> Result<Option<EventDetail>, BaniaError> {
        let Some(event) = self.events.find_active_event_by_slug(slug).await? else {
            return Ok(None);
        };
        let embed_url = build_embed_url(&event.calendly_url, query.tg_user_id, query.name.as_deref())?;
        Ok(Some(EventDetail {
            event: MiniAppEvent::from(&event),
            embed_url: embed_url.to_string(),
        }))
    }
}

fn list_page_url() -> String {
    format!("{}/miniapp", API_PREFIX)
}

fn booking_base_url() -> String {
    format!("{}/miniapp/book", API_PREFIX)
}

// --- JSON ---

#[axum::debug_handler]
pub async fn list_events_handler(
    State(state): State<Arc<MiniAppState>>,
) -> Result<Json<Value>, BaniaError> {
    let events = state.active_events().await?;
    Ok(Json(json!({ "events": events })))
}

#[axum::debug_handler]
pub async fn event_detail_handler(
    State(state): State<Arc<MiniAppState>>,
    Path(slug): Path<String>,
    Query(query): Query<EmbedQuery>,
) -> Result<Json<EventDetail>, BaniaError> {
    state
        .event_detail(&slug, &query)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("Event '{}'", slug)))
}

// --- Pages ---

#[axum::debug_handler]
pub async fn list_page_handler(State(state): State<Arc<MiniAppState>>) -> Response {
    match state.active_events().await {
        Ok(events) => Html(render_event_list(&events, &booking_base_url())).into_response(),
        Err(e) => {
            error!("Failed to load Mini App events: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, Html(render_unavailable())).into_response()
        }
    }
}

#[axum::debug_handler]
pub async fn booking_page_handler(
    State(state): State<Arc<MiniAppState>>,
    Path(slug): Path<String>,
    Query(query): Query<EmbedQuery>,
) -> Response {
    match state.event_detail(&slug, &query).await {
        Ok(Some(detail)) => {
            info!(
                "Booking page for '{}' (telegram user: {:?})",
                slug, query.tg_user_id
            );
            Html(render_booking_page(&detail.event, &detail.embed_url)).into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, Html(render_not_found(&list_page_url()))).into_response(),
        Err(e) => {
            error!("Failed to load booking page for '{}': {}", slug, e);
            (StatusCode::SERVICE_UNAVAILABLE, Html(render_unavailable())).into_response()
        }
    }
}
