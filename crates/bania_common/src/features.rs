//! Runtime checks for the optional integrations.
//!
//! Every integration is compiled in; whether it is usable depends on the
//! configuration. Missing credentials switch an integration off instead of
//! failing startup.

use bania_config::AppConfig;

/// A runtime flag is only honoured when its config section is present.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

/// Telegram notifications and the bot need both the flag and a bot token.
pub fn is_telegram_enabled(config: &AppConfig) -> bool {
    let token = config
        .telegram
        .as_ref()
        .and_then(|t| t.bot_token.as_ref())
        .filter(|t| !t.is_empty());
    is_feature_enabled(config.use_telegram, token)
}

/// A Postgres url is configured; otherwise the in-memory store is used.
pub fn is_database_configured(config: &AppConfig) -> bool {
    config
        .database
        .as_ref()
        .and_then(|d| d.url.as_ref())
        .is_some_and(|u| !u.is_empty())
}

/// Photo storage needs a Supabase url.
pub fn is_storage_configured(config: &AppConfig) -> bool {
    config
        .supabase
        .as_ref()
        .and_then(|s| s.url.as_ref())
        .is_some_and(|u| !u.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bania_config::{DatabaseConfig, TelegramConfig};

    #[test]
    fn telegram_needs_flag_and_token() {
        let mut config = AppConfig::default();
        assert!(!is_telegram_enabled(&config));

        config.telegram = Some(TelegramConfig {
            bot_token: Some("123:abc".into()),
            ..TelegramConfig::default()
        });
        assert!(!is_telegram_enabled(&config));

        config.use_telegram = true;
        assert!(is_telegram_enabled(&config));
    }

    #[test]
    fn database_needs_non_empty_url() {
        let mut config = AppConfig::default();
        config.database = Some(DatabaseConfig { url: Some(String::new()), max_connections: 5 });
        assert!(!is_database_configured(&config));
        config.database = Some(DatabaseConfig {
            url: Some("postgres://localhost/bania".into()),
            max_connections: 5,
        });
        assert!(is_database_configured(&config));
    }
}
