//! Environment variable handling for the Bania services.
//!
//! Config files mark values that live outside the repository with the literal
//! string `"secret_from_env"`. This module resolves those markers by config path,
//! trying the prefixed names first and the plain deployment names last
//! (`calendly.webhook_signing_key` -> `CALENDLY_WEBHOOK_SIGNING_KEY`).

use serde_json::Value;
use std::env;

/// The marker that asks for a value to be read from the environment
pub const ENV_MARKER: &str = "secret_from_env";

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "BANIA";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "BANIA_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// `"server.host"` becomes `"BANIA__SERVER__HOST"`.
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to an environment variable name
///
/// `"telegram.bot_token"` becomes `"BANIA_SECRET_TELEGRAM_BOT_TOKEN"`.
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// Convert a path to the unprefixed deployment name, e.g. `"SUPABASE_SERVICE_ROLE_KEY"`.
pub fn legacy_path_to_env_var(path: &str) -> String {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.len() < 2 {
        return path.to_uppercase();
    }

    let service = parts[0];
    let key = parts[1..].join(SECRET_SEPARATOR);
    format!("{}_{}", service, key).to_uppercase()
}

/// Paths containing "secret", "key", "password" or "token" are treated as secrets.
pub fn is_secret_path(path: &str) -> bool {
    let path_lower = path.to_lowercase();
    path_lower.contains("secret")
        || path_lower.contains("key")
        || path_lower.contains("password")
        || path_lower.contains("token")
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable for a path
///
/// Secret paths look at `BANIA_SECRET_*`, plain paths at `BANIA__*`; both fall
/// back to the unprefixed deployment name.
pub fn get_env_var(path: &str) -> Option<String> {
    let primary = if is_secret_path(path) {
        secret_path_to_env_var(path)
    } else {
        config_path_to_env_var(path)
    };
    non_empty_var(&primary).or_else(|| non_empty_var(&legacy_path_to_env_var(path)))
}

/// Walk a configuration tree and resolve every `"secret_from_env"` marker.
///
/// Returns `(dotted.path, value)` pairs. A `None` value means no variable was
/// set, and the setting should be treated as absent.
pub fn collect_env_markers(value: &Value) -> Vec<(String, Option<String>)> {
    fn walk(path: &mut Vec<String>, obj: &Value, out: &mut Vec<(String, Option<String>)>) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map {
                    path.push(k.clone());
                    walk(path, v, out);
                    path.pop();
                }
            }
            Value::String(s) if s == ENV_MARKER => {
                let path_str = path.join(".");
                let resolved = get_env_var(&path_str);
                if resolved.is_none() {
                    tracing::debug!("No environment value for {}", path_str);
                }
                out.push((path_str, resolved));
            }
            _ => {}
        }
    }

    let mut out = Vec::new();
    walk(&mut Vec::new(), value, &mut out);
    out
}
