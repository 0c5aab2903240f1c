use once_cell::sync::Lazy;
use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;

/// Default timeout for outbound third-party calls in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Shared client for Calendly, Telegram and Storage calls.
///
/// Falls back to an unconfigured client if the builder fails, so a TLS
/// backend problem surfaces on the first request instead of at startup.
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    create_client(DEFAULT_TIMEOUT_SECS, true).unwrap_or_else(|err| {
        tracing::error!("Failed to build configured HTTP client: {}", err);
        Client::new()
    })
});

/// Creates a new HTTP client with custom configuration.
pub fn create_client(timeout_secs: u64, follow_redirects: bool) -> Result<Client, ReqwestError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .redirect(if follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        })
        .build()
}
