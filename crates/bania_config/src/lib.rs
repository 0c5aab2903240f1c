//! Layered configuration: `config/default` -> `config/<RUN_ENV>` -> `BANIA__*`
//! environment variables, with `"secret_from_env"` markers resolved last.

use config::{Config, ConfigError, Environment, File, Value, ValueKind};
use once_cell::sync::OnceCell;
use std::env;

pub mod env_vars;
pub mod models;

pub use env_vars::{collect_env_markers, get_env_var};
pub use models::*;

pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("BANIA_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    load_config_from(&config_dir, &run_env)
}

/// Loads the configuration from an explicit directory and environment name.
pub fn load_config_from(config_dir: &str, run_env: &str) -> Result<AppConfig, ConfigError> {
    let prefix = env_vars::get_config_prefix();

    let builder = Config::builder()
        .add_source(File::with_name(&format!("{config_dir}/default")).required(false))
        .add_source(File::with_name(&format!("{config_dir}/{run_env}")).required(false))
        .add_source(Environment::with_prefix(&prefix).separator(env_vars::CONFIG_SEPARATOR))
        .set_override("run_env", run_env)?;

    // First pass only locates the markers; the overrides are applied on the builder
    // so that numeric strings still coerce into their target types.
    let raw: serde_json::Value = builder.clone().build()?.try_deserialize()?;
    let mut builder = builder;
    for (path, resolved) in collect_env_markers(&raw) {
        builder = match resolved {
            Some(value) => builder.set_override(path, value)?,
            None => builder.set_override(path, Value::new(None, ValueKind::Nil))?,
        };
    }

    let config: AppConfig = builder.build()?.try_deserialize()?;
    tracing::debug!("Configuration loaded for run_env={}", config.run_env);
    Ok(config)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file once per process.
///
/// `DOTENV_OVERRIDE` selects another file, otherwise `.env` in the working
/// directory is used. A missing file is not an error.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
