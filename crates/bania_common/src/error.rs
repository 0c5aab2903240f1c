use std::fmt;
use thiserror::Error;

/// The base error type shared by all Bania crates.
///
/// Feature crates keep their own error enums and implement
/// `From<SpecificError> for BaniaError` so handlers can map everything to one
/// HTTP taxonomy.
#[derive(Error, Debug)]
pub enum BaniaError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Missing or invalid credentials, or a bad webhook signature
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for BaniaError {
    fn status_code(&self) -> u16 {
        match self {
            BaniaError::HttpError(_) => 502,
            BaniaError::ParseError(_) => 400,
            BaniaError::ConfigError(_) => 500,
            BaniaError::AuthError(_) => 401,
            BaniaError::ValidationError(_) => 400,
            BaniaError::DatabaseError(_) => 500,
            BaniaError::ExternalServiceError { .. } => 502,
            BaniaError::ConflictError(_) => 409,
            BaniaError::NotFoundError(_) => 404,
            BaniaError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for BaniaError {
    fn from(err: reqwest::Error) -> Self {
        BaniaError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for BaniaError {
    fn from(err: serde_json::Error) -> Self {
        BaniaError::ParseError(err.to_string())
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> BaniaError {
    BaniaError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> BaniaError {
    BaniaError::NotFoundError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> BaniaError {
    BaniaError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> BaniaError {
    BaniaError::InternalError(message.to_string())
}
