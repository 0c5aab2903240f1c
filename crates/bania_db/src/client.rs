//! Postgres client
//!
//! A thin wrapper over a `sqlx` connection pool. It connects with full
//! privileges and is only handed to server-side code (webhooks, admin actions,
//! Mini App reads).

use crate::error::DbError;
use bania_config::{AppConfig, DatabaseConfig};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct DbClient {
    /// The database connection pool
    pool: PgPool,
}

impl DbClient {
    /// Create a client from the `[database]` section.
    ///
    /// # Errors
    ///
    /// * The database configuration or its url is missing
    /// * The database connection fails
    pub async fn new(config: &AppConfig) -> Result<Self, DbError> {
        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| DbError::ConfigError("Database configuration is missing".to_string()))?;

        Self::from_config(db_config).await
    }

    pub async fn from_config(db_config: &DatabaseConfig) -> Result<Self, DbError> {
        let db_url = db_config
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| DbError::ConfigError("Database URL is empty".to_string()))?;

        Self::from_url(db_url, db_config.max_connections).await
    }

    pub async fn from_url(db_url: &str, max_connections: u32) -> Result<Self, DbError> {
        debug!("Creating database pool (max_connections={})", max_connections);

        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(3))
            .idle_timeout(Duration::from_secs(600))
            .connect(db_url)
            .await
            .map_err(|e| {
                error!("Failed to create database pool: {}", e);
                DbError::PoolError(e.to_string())
            })?;

        info!("Database pool created successfully");
        Ok(Self { pool })
    }

    /// Wrap an existing pool, e.g. one created by a test harness.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check if the database answers a trivial query
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

impl std::fmt::Display for DbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DbClient")
    }
}
