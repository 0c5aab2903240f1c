//! Service abstractions shared between feature crates.
//!
//! The backend constructs one implementation of each trait at startup and hands
//! it to the routers as `Arc<dyn Trait>`, so handlers never reach for globals and
//! tests can substitute recording fakes.

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;

use crate::error::BaniaError;
use crate::models::Booking;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Cache key of the admin events listing. Other event views nest below it.
pub const EVENTS_VIEW: &str = "events";
/// Cache key of the Mini App listing of active events.
pub const ACTIVE_EVENTS_VIEW: &str = "events/active";

/// Sends messages to end users about their bookings.
pub trait NotificationService: Send + Sync {
    /// Confirm a freshly created booking to the chat that started it.
    fn notify_booking_confirmed<'a>(
        &'a self,
        chat_id: i64,
        booking: &'a Booking,
    ) -> BoxFuture<'a, (), BaniaError>;
}

/// Drops cached renderings of an admin view after a mutation.
pub trait ViewInvalidator: Send + Sync {
    fn invalidate(&self, view: &str);
}

/// Process-local cache of rendered admin views, keyed by view name.
///
/// Invalidating `"events"` also drops `"events/<view>"` entries.
#[derive(Debug, Default)]
pub struct ViewCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().ok().and_then(|e| e.get(key).cloned())
    }

    pub fn put(&self, key: &str, value: Value) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ViewInvalidator for ViewCache {
    fn invalidate(&self, view: &str) {
        if let Ok(mut entries) = self.entries.write() {
            let nested = format!("{}/", view);
            entries.retain(|k, _| k != view && !k.starts_with(&nested));
            tracing::debug!("Invalidated view cache for '{}'", view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invalidate_drops_view_and_children() {
        let cache = ViewCache::new();
        cache.put("dashboard", json!([1]));
        cache.put(EVENTS_VIEW, json!([]));
        cache.put(ACTIVE_EVENTS_VIEW, json!({}));
        cache.put("eventsx", json!({}));

        cache.invalidate(EVENTS_VIEW);

        assert_eq!(cache.get("dashboard"), Some(json!([1])));
        assert!(cache.get(EVENTS_VIEW).is_none());
        assert!(cache.get(ACTIVE_EVENTS_VIEW).is_none());
        assert!(cache.get("eventsx").is_some());
        assert_eq!(cache.len(), 2);
    }
}
