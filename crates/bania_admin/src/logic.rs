use bania_common::models::{Booking, DashboardStats, Event};
use bania_common::services::{ViewCache, EVENTS_VIEW};
use bania_common::time::local_day_bounds;
use bania_common::BaniaError;
use bania_db::{BookingRepository, EventRepository};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

/// Bookings shown in the dashboard's upcoming list.
pub const UPCOMING_LIMIT: i64 = 10;

// --- Request Structs ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize)]
pub struct ReorderRequest {
    /// Event ids in their new order; position `i` gets `display_order = i`.
    pub event_ids: Vec<Uuid>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize)]
pub struct ToggleActiveRequest {
    pub is_active: bool,
}

// --- Response Structs ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    #[serde(flatten)]
    pub stats: DashboardStats,
    pub upcoming: Vec<Booking>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReorderOutcome {
    pub updated: usize,
    pub failed: usize,
}

// --- Logic ---

/// All events ordered by `display_order`, served from the view cache when warm.
pub async fn cached_event_list(
    events: &dyn EventRepository,
    cache: &ViewCache,
) -> Result<Value, BaniaError> {
    if let Some(hit) = cache.get(EVENTS_VIEW) {
        debug!("Serving admin events from view cache");
        return Ok(hit);
    }
    let list: Vec<Event> = events.list_events().await?;
    let value = serde_json::to_value(&list)?;
    cache.put(EVENTS_VIEW, value.clone());
    Ok(value)
}

/// Sets `display_order` to the list position of every id, all writes in flight
/// at once. Ids matching no event count as failures.
pub async fn reorder_events(events: &dyn EventRepository, ids: &[Uuid]) -> ReorderOutcome {
    let writes = ids
        .iter()
        .enumerate()
        .map(|(index, id)| async move {
            let order = i32::try_from(index).unwrap_or(i32::MAX);
            (id, events.set_display_order(*id, order).await)
        });

    let mut outcome = ReorderOutcome::default();
    for (id, result) in join_all(writes).await {
        match result {
            Ok(true) => outcome.updated += 1,
            Ok(false) => {
                warn!("Reorder: event {} not found", id);
                outcome.failed += 1;
            }
            Err(e) => {
                warn!("Reorder: failed to move event {}: {}", id, e);
                outcome.failed += 1;
            }
        }
    }
    outcome
}

/// Counters plus the next bookings; "today" is the calendar day in `timezone`.
pub async fn build_dashboard(
    bookings: &dyn BookingRepository,
    now: DateTime<Utc>,
    timezone: Tz,
) -> Result<Dashboard, BaniaError> {
    let (day_start, day_end) = local_day_bounds(now, timezone);
    let stats = bookings.dashboard_stats(day_start, day_end, now).await?;
    let upcoming = bookings.upcoming_bookings(now, UPCOMING_LIMIT).await?;
    Ok(Dashboard { stats, upcoming })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bania_common::models::NewEvent;
    use bania_common::services::ViewInvalidator;
    use bania_db::InMemoryStore;
    use serde_json::json;

    fn new_event(slug: &str) -> NewEvent {
        serde_json::from_value(json!({
            "name": slug,
            "slug": slug,
            "duration": 60,
            "calendly_url": format!("https://calendly.com/bania/{}", slug),
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn reorder_assigns_positions() {
        let store = InMemoryStore::new();
        let a = store.insert_event(new_event("a")).await.unwrap();
        let b = store.insert_event(new_event("b")).await.unwrap();
        let c = store.insert_event(new_event("c")).await.unwrap();

        let outcome = reorder_events(&store, &[c.id, a.id, b.id]).await;
        assert_eq!(outcome, ReorderOutcome { updated: 3, failed: 0 });

        let order: Vec<(String, i32)> = store
            .list_events()
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.slug, e.display_order))
            .collect();
        assert_eq!(
            order,
            vec![("c".to_string(), 0), ("a".to_string(), 1), ("b".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn reorder_counts_unknown_ids() {
        let store = InMemoryStore::new();
        let a = store.insert_event(new_event("a")).await.unwrap();
        let outcome = reorder_events(&store, &[Uuid::new_v4(), a.id]).await;
        assert_eq!(outcome, ReorderOutcome { updated: 1, failed: 1 });
        assert_eq!(store.find_event(a.id).await.unwrap().unwrap().display_order, 1);
    }

    #[tokio::test]
    async fn event_list_is_cached_until_invalidated() {
        let store = InMemoryStore::new();
        let cache = ViewCache::new();
        store.insert_event(new_event("a")).await.unwrap();

        let first = cached_event_list(&store, &cache).await.unwrap();
        assert_eq!(first.as_array().unwrap().len(), 1);

        store.insert_event(new_event("b")).await.unwrap();
        let stale = cached_event_list(&store, &cache).await.unwrap();
        assert_eq!(stale.as_array().unwrap().len(), 1);

        cache.invalidate(EVENTS_VIEW);
        let fresh = cached_event_list(&store, &cache).await.unwrap();
        assert_eq!(fresh.as_array().unwrap().len(), 2);
    }

    #[test]
    fn dashboard_flattens_stats() {
        let dashboard = Dashboard {
            stats: DashboardStats {
                today_bookings: 1,
                upcoming_bookings: 2,
                pending_payments: 3,
                total_revenue: 50.0,
            },
            upcoming: vec![],
        };
        assert_eq!(
            serde_json::to_value(&dashboard).unwrap(),
            json!({
                "today_bookings": 1,
                "upcoming_bookings": 2,
                "pending_payments": 3,
                "total_revenue": 50.0,
                "upcoming": []
            })
        );
    }
}
