use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEZONE: &str = "Europe/Moscow";
pub const DEFAULT_PHOTO_BUCKET: &str = "event-photos";
pub const DEFAULT_CALENDLY_API_BASE: &str = "https://api.calendly.com";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// --- Database Config ---
// The url is usually resolved from DATABASE_URL through the "secret_from_env" marker.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

// --- Supabase Storage Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
    #[serde(default)]
    pub service_role_key: Option<String>,
    #[serde(default = "default_photo_bucket")]
    pub photo_bucket: String,
}

fn default_photo_bucket() -> String {
    DEFAULT_PHOTO_BUCKET.to_string()
}

// --- Calendly Config ---
// Secrets loaded from CALENDLY_API_TOKEN and CALENDLY_WEBHOOK_SIGNING_KEY.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CalendlyConfig {
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub webhook_signing_key: Option<String>,
    #[serde(default = "default_calendly_api_base")]
    pub api_base_url: String,
}

fn default_calendly_api_base() -> String {
    DEFAULT_CALENDLY_API_BASE.to_string()
}

impl Default for CalendlyConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            webhook_signing_key: None,
            api_base_url: default_calendly_api_base(),
        }
    }
}

// --- Telegram Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Public URL of the Mini App, opened by the "Book a Session" button.
    #[serde(default)]
    pub webapp_url: Option<String>,
    /// Expected value of the `X-Telegram-Bot-Api-Secret-Token` header.
    #[serde(default)]
    pub webhook_secret: Option<String>,
    #[serde(default = "default_telegram_api_base")]
    pub api_base_url: String,
}

fn default_telegram_api_base() -> String {
    DEFAULT_TELEGRAM_API_BASE.to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            webapp_url: None,
            webhook_secret: None,
            api_base_url: default_telegram_api_base(),
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AdminConfig {
    pub api_secret: Option<String>, // ADMIN_API_SECRET
}

// --- Photo pipeline ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PhotoConfig {
    pub resize: bool,
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            resize: true,
            max_width: 1600,
            max_height: 1600,
            jpeg_quality: 82,
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for daily rolling log files. Stdout only when unset.
    pub file_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_dir: None,
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    pub timezone: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    #[serde(default = "default_run_env")]
    pub run_env: String,

    // --- Runtime Flags ---
    #[serde(default)]
    pub use_telegram: bool,

    // --- Optional Integrations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub supabase: Option<SupabaseConfig>,
    #[serde(default)]
    pub calendly: Option<CalendlyConfig>,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub admin: Option<AdminConfig>,

    #[serde(default)]
    pub photo: PhotoConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_run_env() -> String {
    "development".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            run_env: default_run_env(),
            use_telegram: false,
            database: None,
            supabase: None,
            calendly: None,
            telegram: None,
            admin: None,
            photo: PhotoConfig::default(),
            logging: LoggingConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.run_env == "production"
    }

    /// The configured webhook signing key, ignoring blank values.
    pub fn calendly_signing_key(&self) -> Option<&str> {
        self.calendly
            .as_ref()
            .and_then(|c| c.webhook_signing_key.as_deref())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn admin_secret(&self) -> Option<&str> {
        self.admin
            .as_ref()
            .and_then(|a| a.api_secret.as_deref())
            .filter(|s| !s.is_empty())
    }
}
