use bania_calendly::EventTypeSource;
use bania_common::services::{NotificationService, ViewCache};
use bania_config::AppConfig;
use bania_db::{BookingRepository, DbClient, DbError, EventRepository, PhotoStorage};
use std::sync::Arc;

use crate::service_factory::{
    create_event_type_source, create_notifier, create_photo_storage, create_stores, Stores,
};

/// Everything the routers are built from, constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub events: Arc<dyn EventRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub storage: Arc<dyn PhotoStorage>,
    pub notifier: Option<Arc<dyn NotificationService>>,
    pub calendly: Option<Arc<dyn EventTypeSource>>,
    /// Shared by the admin and Mini App routers.
    pub cache: Arc<ViewCache>,
    pub db: Option<DbClient>,
}

impl AppState {
    /// Fails when a configured database cannot be reached or initialized.
    pub async fn from_config(config: Arc<AppConfig>) -> Result<Self, DbError> {
        let stores = create_stores(&config).await?;
        Ok(Self::with_stores(config, stores))
    }

    /// In-memory store; external integrations still follow the configuration.
    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self::with_stores(config, Stores::in_memory())
    }

    fn with_stores(config: Arc<AppConfig>, stores: Stores) -> Self {
        Self {
            storage: create_photo_storage(&config),
            notifier: create_notifier(&config),
            calendly: create_event_type_source(&config),
            cache: Arc::new(ViewCache::new()),
            events: stores.events,
            bookings: stores.bookings,
            db: stores.db,
            config,
        }
    }
}
