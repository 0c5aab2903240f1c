use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use bania_calendly::{sync_events_from_calendly, CalendlyError, EventTypeSource};
use bania_common::models::{
    Booking, BookingFilter, EventPatch, NewEvent, PaymentStatus, PaymentUpdate,
};
use bania_common::services::{ViewCache, ViewInvalidator, EVENTS_VIEW};
use bania_common::time::parse_timezone;
use bania_common::{
    action_failure_body, action_success, not_found, validation_error, ActionFailure, BaniaError,
    HttpStatusCode,
};
use bania_config::AppConfig;
use bania_db::{BookingRepository, EventRepository, PhotoStorage};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::logic::{
    build_dashboard, cached_event_list, reorder_events, Dashboard, ReorderRequest,
    ToggleActiveRequest,
};
use crate::photo::{
    file_name_from_url, photo_file_name, prepare_photo, remove_stored_photo, PhotoError,
};

// --- State for Admin Handlers ---
pub struct AdminState {
    pub config: Arc<AppConfig>,
    pub events: Arc<dyn EventRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub storage: Arc<dyn PhotoStorage>,
    pub cache: Arc<ViewCache>,
    /// `None` when no Calendly API token is configured.
    pub calendly: Option<Arc<dyn EventTypeSource>>,
}

impl AdminState {
    fn events_changed(&self) {
        self.cache.invalidate(EVENTS_VIEW);
    }

    async fn update_event(&self, id: Uuid, patch: &EventPatch) -> Result<Value, ActionFailure> {
        let event = self
            .events
            .update_event(id, patch)
            .await
            .map_err(BaniaError::from)?
            .ok_or_else(|| not_found(format!("Event {}", id)))?;
        self.events_changed();
        Ok(json!({ "event": event }))
    }
}

// --- Events ---

#[axum::debug_handler]
pub async fn list_events_handler(
    State(state): State<Arc<AdminState>>,
) -> Result<Json<Value>, BaniaError> {
    cached_event_list(state.events.as_ref(), &state.cache)
        .await
        .map(Json)
}

#[axum::debug_handler]
pub async fn create_event_handler(
    State(state): State<Arc<AdminState>>,
    Json(new_event): Json<NewEvent>,
) -> Result<(StatusCode, Json<Value>), ActionFailure> {
    new_event.validate().map_err(validation_error)?;
    let event = state
        .events
        .insert_event(new_event)
        .await
        .map_err(BaniaError::from)?;
    info!("Created event {} ({})", event.slug, event.id);
    state.events_changed();
    Ok((StatusCode::CREATED, action_success(json!({ "event": event }))))
}

#[axum::debug_handler]
pub async fn update_event_handler(
    State(state): State<Arc<AdminState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<EventPatch>,
) -> Result<Json<Value>, ActionFailure> {
    patch.validate().map_err(validation_error)?;
    if patch.is_empty() {
        return Err(validation_error("Nothing to update").into());
    }
    let body = state.update_event(id, &patch).await?;
    Ok(action_success(body))
}

#[axum::debug_handler]
pub async fn toggle_event_active_handler(
    State(state): State<Arc<AdminState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ToggleActiveRequest>,
) -> Result<Json<Value>, ActionFailure> {
    let patch = EventPatch {
        is_active: Some(req.is_active),
        ..Default::default()
    };
    let body = state.update_event(id, &patch).await?;
    Ok(action_success(body))
}

#[axum::debug_handler]
pub async fn delete_event_handler(
    State(state): State<Arc<AdminState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ActionFailure> {
    let deleted = state.events.delete_event(id).await.map_err(BaniaError::from)?;
    if !deleted {
        return Err(not_found(format!("Event {}", id)).into());
    }
    info!("Deleted event {}", id);
    state.events_changed();
    Ok(action_success(Value::Null))
}

/// Deletes the stored file (best effort) and clears `photo_url`.
#[axum::debug_handler]
pub async fn remove_event_photo_handler(
    State(state): State<Arc<AdminState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ActionFailure> {
    let event = state
        .events
        .find_event(id)
        .await
        .map_err(BaniaError::from)?
        .ok_or_else(|| not_found(format!("Event {}", id)))?;

    if let Some(url) = event.photo_url.as_deref() {
        remove_stored_photo(state.storage.as_ref(), url).await;
    }
    let patch = EventPatch {
        photo_url: Some(None),
        ..Default::default()
    };
    let body = state.update_event(id, &patch).await?;
    Ok(action_success(body))
}

#[axum::debug_handler]
pub async fn reorder_events_handler(
    State(state): State<Arc<AdminState>>,
    Json(req): Json<ReorderRequest>,
) -> Response {
    let outcome = reorder_events(state.events.as_ref(), &req.event_ids).await;
    // Successful writes stay applied even when others failed.
    state.events_changed();

    if outcome.failed > 0 {
        error!(
            "Reorder: {} of {} events failed",
            outcome.failed,
            req.event_ids.len()
        );
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(action_failure_body("Failed to reorder some events")),
        )
            .into_response();
    }
    action_success(json!({ "updated": outcome.updated })).into_response()
}

#[axum::debug_handler]
pub async fn sync_events_handler(
    State(state): State<Arc<AdminState>>,
) -> Result<Json<Value>, ActionFailure> {
    let source = state
        .calendly
        .as_ref()
        .ok_or_else(|| BaniaError::from(CalendlyError::MissingCredential))?;

    let report = sync_events_from_calendly(source.as_ref(), state.events.as_ref(), &*state.cache)
        .await
        .map_err(|e| {
            error!("Calendly sync failed: {}", e);
            BaniaError::from(e)
        })?;

    Ok(action_success(json!({
        "created": report.created,
        "updated": report.updated,
        "deactivated": report.deactivated,
        "failed": report.failed,
    })))
}

// --- Photo upload ---

struct Upload {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

fn photo_failure(err: PhotoError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(action_failure_body(&err.to_string()))).into_response()
}

async fn store_event_photo(state: &AdminState, event_id: Uuid, upload: Upload) -> Result<String, BaniaError> {
    let event = state
        .events
        .find_event(event_id)
        .await?
        .ok_or_else(|| not_found(format!("Event {}", event_id)))?;

    let photo_config = state.config.photo.clone();
    let prepared = tokio::task::spawn_blocking(move || {
        prepare_photo(
            upload.bytes,
            &upload.file_name,
            upload.content_type.as_deref(),
            &photo_config,
        )
    })
    .await
    .map_err(|e| PhotoError::Processing(e.to_string()))??;

    let file_name = photo_file_name(event_id, Utc::now().timestamp_millis(), &prepared.extension);
    state
        .storage
        .upload(&file_name, prepared.bytes, &prepared.content_type)
        .await
        .map_err(PhotoError::from)?;
    let url = state.storage.public_url(&file_name);

    let patch = EventPatch {
        photo_url: Some(Some(url.clone())),
        ..Default::default()
    };
    state
        .events
        .update_event(event_id, &patch)
        .await?
        .ok_or_else(|| not_found(format!("Event {}", event_id)))?;

    if let Some(previous) = event.photo_url.as_deref() {
        if file_name_from_url(previous) != Some(file_name.as_str()) {
            remove_stored_photo(state.storage.as_ref(), previous).await;
        }
    }
    state.events_changed();
    info!("Stored photo {} for event {}", file_name, event_id);
    Ok(url)
}

/// Multipart form with `file` and `eventId`.
#[axum::debug_handler]
pub async fn upload_photo_handler(
    State(state): State<Arc<AdminState>>,
    mut multipart: Multipart,
) -> Response {
    let mut upload: Option<Upload> = None;
    let mut event_id: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed upload form: {}", e);
                return (e.status(), Json(action_failure_body(&e.body_text()))).into_response();
            }
        };
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                match field.bytes().await {
                    Ok(bytes) if !bytes.is_empty() => {
                        upload = Some(Upload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        })
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Failed to read uploaded file: {}", e);
                        return (e.status(), Json(action_failure_body(&e.body_text()))).into_response();
                    }
                }
            }
            Some("eventId") => match field.text().await {
                Ok(text) if !text.trim().is_empty() => event_id = Some(text.trim().to_string()),
                Ok(_) => {}
                Err(e) => {
                    return (e.status(), Json(action_failure_body(&e.body_text()))).into_response();
                }
            },
            _ => {}
        }
    }

    let (Some(upload), Some(event_id)) = (upload, event_id) else {
        return photo_failure(PhotoError::MissingField);
    };
    let Ok(event_id) = Uuid::parse_str(&event_id) else {
        return photo_failure(PhotoError::InvalidEventId(event_id));
    };

    match store_event_photo(&state, event_id, upload).await {
        Ok(url) => action_success(json!({ "url": url })).into_response(),
        Err(e) => {
            error!("Photo upload for event {} failed: {}", event_id, e);
            ActionFailure(e).into_response()
        }
    }
}

// --- Bookings ---

#[axum::debug_handler]
pub async fn list_bookings_handler(
    State(state): State<Arc<AdminState>>,
    Query(filter): Query<BookingFilter>,
) -> Result<Json<Vec<Booking>>, BaniaError> {
    let bookings = state.bookings.list_bookings(&filter).await?;
    Ok(Json(bookings))
}

#[axum::debug_handler]
pub async fn get_booking_handler(
    State(state): State<Arc<AdminState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, BaniaError> {
    state
        .bookings
        .find_booking(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("Booking {}", id)))
}

#[axum::debug_handler]
pub async fn update_payment_handler(
    State(state): State<Arc<AdminState>>,
    Path(id): Path<Uuid>,
    Json(update): Json<PaymentUpdate>,
) -> Result<Json<Value>, ActionFailure> {
    update.validate().map_err(validation_error)?;
    let booking = state
        .bookings
        .update_payment(id, &update)
        .await
        .map_err(BaniaError::from)?
        .ok_or_else(|| not_found(format!("Booking {}", id)))?;
    info!("Booking {} payment set to {}", id, booking.payment_status);
    Ok(action_success(json!({ "booking": booking })))
}

#[axum::debug_handler]
pub async fn mark_booking_paid_handler(
    State(state): State<Arc<AdminState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ActionFailure> {
    let booking = state
        .bookings
        .set_payment_status(id, PaymentStatus::Paid)
        .await
        .map_err(BaniaError::from)?
        .ok_or_else(|| not_found(format!("Booking {}", id)))?;
    info!("Booking {} marked paid", id);
    Ok(action_success(json!({ "booking": booking })))
}

// --- Dashboard ---

#[axum::debug_handler]
pub async fn dashboard_handler(
    State(state): State<Arc<AdminState>>,
) -> Result<Json<Dashboard>, BaniaError> {
    let timezone = parse_timezone(&state.config.display.timezone);
    build_dashboard(state.bookings.as_ref(), Utc::now(), timezone)
        .await
        .map(Json)
}
