//! Builds the services the routers are injected with.
//!
//! Every integration is optional. A missing or broken configuration logs a
//! warning and falls back (in-memory store, in-memory photo storage) or turns
//! the integration off (notifications, Calendly sync).
use bania_calendly::{CalendlyClient, EventTypeSource};
use bania_common::features::{is_database_configured, is_storage_configured, is_telegram_enabled};
use bania_common::services::NotificationService;
use bania_common::time::parse_timezone;
use bania_config::AppConfig;
use bania_db::{
    schema::init_schema, BookingRepository, ClientRole, DbClient, DbError, EventRepository,
    InMemoryStore, MemoryStorage, PhotoStorage, SqlBookingRepository, SqlEventRepository, SupabaseStorage,
};
use bania_telegram::{TelegramClient, TelegramNotifier};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Public base of photos kept in memory; nothing serves them.
pub const MEMORY_STORAGE_BASE: &str = "memory://event-photos";

pub struct Stores {
    pub events: Arc<dyn EventRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    /// `None` when running on the in-memory store.
    pub db: Option<DbClient>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            events: store.clone(),
            bookings: store,
            db: None,
        }
    }
}

/// Postgres when a database url is configured, in memory when none is.
///
/// A configured database that cannot be reached or initialized is an error,
/// never a fallback to memory.
pub async fn create_stores(config: &AppConfig) -> Result<Stores, DbError> {
    if !is_database_configured(config) {
        warn!("No database configured, using the in-memory store (data is lost on restart)");
        return Ok(Stores::in_memory());
    }

    info!("Connecting to Postgres...");
    let client = DbClient::new(config).await.map_err(|e| {
        error!("Database unavailable: {}", e);
        e
    })?;
    init_schema(&client).await.map_err(|e| {
        error!("Schema initialization failed: {}", e);
        e
    })?;

    Ok(Stores {
        events: Arc::new(SqlEventRepository::new(client.clone())),
        bookings: Arc::new(SqlBookingRepository::new(client.clone())),
        db: Some(client),
    })
}

/// Supabase Storage with the service role key, else in memory.
pub fn create_photo_storage(config: &AppConfig) -> Arc<dyn PhotoStorage> {
    if let Some(supabase) = config.supabase.as_ref().filter(|_| is_storage_configured(config)) {
        match SupabaseStorage::new(supabase, ClientRole::ServiceRole) {
            Ok(storage) => {
                info!("Photo storage: Supabase bucket '{}'", supabase.photo_bucket);
                return Arc::new(storage);
            }
            Err(e) => error!("Supabase storage disabled: {}", e),
        }
    }
    warn!("Photo storage: in memory");
    Arc::new(MemoryStorage::new(MEMORY_STORAGE_BASE))
}

/// Booking confirmations over the Bot API, when Telegram is enabled.
pub fn create_notifier(config: &AppConfig) -> Option<Arc<dyn NotificationService>> {
    if !is_telegram_enabled(config) {
        info!("Telegram notifications disabled");
        return None;
    }
    let telegram = config.telegram.as_ref()?;
    match TelegramClient::new(telegram) {
        Ok(client) => {
            let timezone = parse_timezone(&config.display.timezone);
            info!("Telegram notifications enabled ({})", timezone);
            Some(Arc::new(TelegramNotifier::new(client, timezone)))
        }
        Err(e) => {
            error!("Telegram notifications disabled: {}", e);
            None
        }
    }
}

/// The Calendly API client used by the admin sync, when a token is configured.
pub fn create_event_type_source(config: &AppConfig) -> Option<Arc<dyn EventTypeSource>> {
    let calendly = config.calendly.as_ref()?;
    match CalendlyClient::new(calendly) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("Calendly sync disabled: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bania_config::{CalendlyConfig, DatabaseConfig, TelegramConfig};

    #[tokio::test]
    async fn falls_back_to_memory() {
        let config = AppConfig::default();
        let stores = create_stores(&config).await.unwrap();
        assert!(stores.db.is_none());
        assert!(stores.events.list_events().await.unwrap().is_empty());
        assert_eq!(
            create_photo_storage(&config).public_url("a.jpg"),
            format!("{}/a.jpg", MEMORY_STORAGE_BASE)
        );
        assert!(create_notifier(&config).is_none());
        assert!(create_event_type_source(&config).is_none());
    }

    #[tokio::test]
    async fn unreachable_database_is_an_error() {
        let config = AppConfig {
            run_env: "production".to_string(),
            database: Some(DatabaseConfig {
                url: Some("postgres://u:p@127.0.0.1:1/bania".to_string()),
                max_connections: 1,
            }),
            ..AppConfig::default()
        };
        assert!(create_stores(&config).await.is_err());
    }

    #[test]
    fn integrations_follow_credentials() {
        let mut config = AppConfig {
            calendly: Some(CalendlyConfig::default()),
            ..AppConfig::default()
        };
        assert!(create_event_type_source(&config).is_none());
        config.calendly = Some(CalendlyConfig {
            api_token: Some("token".into()),
            ..CalendlyConfig::default()
        });
        assert!(create_event_type_source(&config).is_some());

        let telegram = TelegramConfig {
            bot_token: Some("123:ABC".into()),
            ..TelegramConfig::default()
        };
        config.telegram = Some(telegram);
        assert!(create_notifier(&config).is_none());
        config.use_telegram = true;
        assert!(create_notifier(&config).is_some());
    }
}
