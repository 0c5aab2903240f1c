//! Error types for the data-access layer

use bania_common::BaniaError;
use thiserror::Error;

/// Postgres SQLSTATE for `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Errors that can occur when working with the store
#[derive(Debug, Error)]
pub enum DbError {
    /// A unique constraint rejected the write (duplicate webhook delivery, ...)
    #[error("Duplicate record: {0}")]
    UniqueViolation(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// A row that cannot be mapped onto the domain model
    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

impl DbError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return DbError::UniqueViolation(db_err.message().to_string());
            }
        }
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound("row not found".to_string()),
            other => DbError::SqlxError(other),
        }
    }
}

impl From<DbError> for BaniaError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(msg) => BaniaError::ConflictError(msg),
            DbError::NotFound(msg) => BaniaError::NotFoundError(msg),
            DbError::ConfigError(msg) => BaniaError::ConfigError(msg),
            other => BaniaError::DatabaseError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bania_common::HttpStatusCode;

    #[test]
    fn maps_into_common_taxonomy() {
        let dup: BaniaError = DbError::UniqueViolation("bookings_calendly_invitee_uri_key".into()).into();
        assert_eq!(dup.status_code(), 409);
        let missing: BaniaError = DbError::from(sqlx::Error::RowNotFound).into();
        assert_eq!(missing.status_code(), 404);
        let pool: BaniaError = DbError::PoolError("timeout".into()).into();
        assert_eq!(pool.status_code(), 500);
    }
}
