//! Reconciles the stored Event catalog against Calendly's event types.
//!
//! Best effort: each row is written on its own, and a failed write is logged
//! and counted without undoing earlier ones. Only a failure to read either side
//! aborts the pass, before anything is written.

use bania_common::models::{Event, EventPatch, EventSyncFields};
use bania_common::services::{ViewInvalidator, EVENTS_VIEW};
use bania_db::EventRepository;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::EventTypeSource;
use crate::error::CalendlyError;
use crate::models::CalendlyEventType;

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub deactivated: usize,
    /// Rows whose write failed.
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    Create(EventSyncFields),
    Update { id: Uuid, fields: EventSyncFields },
    Deactivate { id: Uuid },
}

/// Works out the writes needed to mirror `remote` into `stored`.
///
/// Stored events without a Calendly uri were created by hand and are never
/// touched. Already inactive events are not deactivated again.
pub fn plan_sync(remote: &[CalendlyEventType], stored: &[Event]) -> Vec<SyncAction> {
    let by_uri: HashMap<&str, &Event> = stored
        .iter()
        .filter_map(|e| e.calendly_event_uri.as_deref().map(|uri| (uri, e)))
        .collect();

    let mut seen = HashSet::new();
    let mut actions = Vec::new();

    for event_type in remote {
        if !seen.insert(event_type.uri.as_str()) {
            continue;
        }
        let fields = event_type.to_sync_fields();
        match by_uri.get(event_type.uri.as_str()) {
            Some(existing) => actions.push(SyncAction::Update { id: existing.id, fields }),
            None => actions.push(SyncAction::Create(fields)),
        }
    }

    for event in stored {
        if let Some(uri) = event.calendly_event_uri.as_deref() {
            if !seen.contains(uri) && event.is_active {
                actions.push(SyncAction::Deactivate { id: event.id });
            }
        }
    }
    actions
}

/// Pulls the remote catalog and applies [`plan_sync`] to the repository, then
/// invalidates the admin events view.
pub async fn sync_events_from_calendly(
    source: &dyn EventTypeSource,
    events: &dyn EventRepository,
    invalidator: &dyn ViewInvalidator,
) -> Result<SyncReport, CalendlyError> {
    let remote = source.fetch_event_types().await?;
    let stored = events.list_events().await?;

    let mut report = SyncReport::default();
    for action in plan_sync(&remote, &stored) {
        match action {
            SyncAction::Create(fields) => {
                let uri = fields.calendly_event_uri.clone();
                match events.insert_event(fields.into_new_event()).await {
                    Ok(_) => report.created += 1,
                    Err(e) => {
                        warn!("Sync: failed to create event {}: {}", uri, e);
                        report.failed += 1;
                    }
                }
            }
            SyncAction::Update { id, fields } => match events.update_sync_fields(id, &fields).await {
                Ok(true) => report.updated += 1,
                Ok(false) => {
                    warn!("Sync: event {} disappeared before update", id);
                    report.failed += 1;
                }
                Err(e) => {
                    warn!("Sync: failed to update event {}: {}", id, e);
                    report.failed += 1;
                }
            },
            SyncAction::Deactivate { id } => {
                let patch = EventPatch {
                    is_active: Some(false),
                    ..Default::default()
                };
                match events.update_event(id, &patch).await {
                    Ok(Some(_)) => report.deactivated += 1,
                    Ok(None) => {
                        warn!("Sync: event {} disappeared before deactivation", id);
                        report.failed += 1;
                    }
                    Err(e) => {
                        warn!("Sync: failed to deactivate event {}: {}", id, e);
                        report.failed += 1;
                    }
                }
            }
        }
    }

    invalidator.invalidate(EVENTS_VIEW);
    info!(
        "Calendly sync finished: {} created, {} updated, {} deactivated, {} failed",
        report.created, report.updated, report.deactivated, report.failed
    );
    Ok(report)
}
