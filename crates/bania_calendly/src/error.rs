use bania_common::{external_service_error, BaniaError, HttpStatusCode};
use bania_db::DbError;
use thiserror::Error;

/// Calendly-specific error types.
#[derive(Error, Debug)]
pub enum CalendlyError {
    /// No API token configured
    #[error("Calendly API token is not configured")]
    MissingCredential,

    /// Error occurred during a Calendly API request
    #[error("Calendly API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Non-success status from the Calendly API. `endpoint` is `API` for the
    /// user lookup and `event_types` for the listing.
    #[error("Calendly {endpoint} error: {status}")]
    ApiError { endpoint: &'static str, status: u16 },

    /// `/event_types` kept returning a `next_page` past the page limit
    #[error("Calendly event_types pagination exceeded {0} pages")]
    TooManyPages(usize),

    /// Error parsing a Calendly API response
    #[error("Failed to parse Calendly response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Webhook signature missing or wrong
    #[error("Invalid signature: {0}")]
    SignatureError(String),

    /// Webhook body does not match any known event shape
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<CalendlyError> for BaniaError {
    fn from(err: CalendlyError) -> Self {
        match err {
            CalendlyError::MissingCredential => BaniaError::ConfigError(err.to_string()),
            CalendlyError::RequestError(e) => external_service_error("Calendly", e),
            e @ CalendlyError::ApiError { .. } => external_service_error("Calendly", e),
            e @ CalendlyError::TooManyPages(_) => external_service_error("Calendly", e),
            CalendlyError::ParseError(e) => {
                BaniaError::ParseError(format!("Calendly response parse error: {}", e))
            }
            CalendlyError::SignatureError(msg) => BaniaError::AuthError(msg),
            CalendlyError::InvalidPayload(msg) => BaniaError::ValidationError(msg),
            CalendlyError::Database(e) => e.into(),
        }
    }
}

impl HttpStatusCode for CalendlyError {
    fn status_code(&self) -> u16 {
        match self {
            CalendlyError::MissingCredential => 500,
            CalendlyError::RequestError(_) => 502,
            CalendlyError::ApiError { .. } => 502,
            CalendlyError::TooManyPages(_) => 502,
            CalendlyError::ParseError(_) => 502,
            CalendlyError::SignatureError(_) => 401,
            CalendlyError::InvalidPayload(_) => 400,
            CalendlyError::Database(_) => 500,
        }
    }
}
