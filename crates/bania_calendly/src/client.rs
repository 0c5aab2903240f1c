//! Calendly API v2 client used by the event-type sync.

use async_trait::async_trait;
use bania_common::HTTP_CLIENT;
use bania_config::CalendlyConfig;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::error::CalendlyError;
use crate::models::{CalendlyEventType, CurrentUserResponse, EventTypesPage};

/// Page size requested from `/event_types`.
pub const EVENT_TYPES_PAGE_SIZE: u32 = 100;

/// Upper bound on fetched `/event_types` pages. A catalog still paginating
/// past it is an error, never a truncated result.
pub const MAX_PAGES: usize = 50;

/// Source of the remote event-type catalog.
#[async_trait]
pub trait EventTypeSource: Send + Sync {
    /// All active event types of the authenticated user.
    async fn fetch_event_types(&self) -> Result<Vec<CalendlyEventType>, CalendlyError>;
}

#[derive(Debug, Clone)]
pub struct CalendlyClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl CalendlyClient {
    /// Fails with [`CalendlyError::MissingCredential`] when no API token is set.
    pub fn new(config: &CalendlyConfig) -> Result<Self, CalendlyError> {
        Self::with_client(HTTP_CLIENT.clone(), config)
    }

    pub fn with_client(client: Client, config: &CalendlyConfig) -> Result<Self, CalendlyError> {
        let api_token = config
            .api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(CalendlyError::MissingCredential)?
            .to_string();
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        endpoint: &'static str,
    ) -> Result<T, CalendlyError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Calendly {} request failed with {}: {}", endpoint, status, body);
            return Err(CalendlyError::ApiError {
                endpoint,
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn url(&self, path: &str) -> Result<Url, CalendlyError> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| CalendlyError::InvalidPayload(format!("bad Calendly url: {}", e)))
    }

    /// Uri of the user owning the API token.
    pub async fn current_user_uri(&self) -> Result<String, CalendlyError> {
        let me: CurrentUserResponse = self.get_json(self.url("/users/me")?, "API").await?;
        Ok(me.resource.uri)
    }

    /// Active event types of `user_uri`, following pagination.
    pub async fn list_event_types(&self, user_uri: &str) -> Result<Vec<CalendlyEventType>, CalendlyError> {
        let mut url = self.url("/event_types")?;
        url.query_pairs_mut()
            .append_pair("user", user_uri)
            .append_pair("count", &EVENT_TYPES_PAGE_SIZE.to_string())
            .append_pair("active", "true");

        let mut all = Vec::new();
        for _ in 0..MAX_PAGES {
            let page: EventTypesPage = self.get_json(url, "event_types").await?;
            all.extend(page.collection);
            match page.pagination.and_then(|p| p.next_page) {
                Some(next) if !next.is_empty() => {
                    url = Url::parse(&next).map_err(|e| {
                        CalendlyError::InvalidPayload(format!("bad next_page url: {}", e))
                    })?;
                }
                _ => return Ok(all),
            }
        }
        error!("Calendly event_types still paginating after {} pages", MAX_PAGES);
        Err(CalendlyError::TooManyPages(MAX_PAGES))
    }
}

#[async_trait]
impl EventTypeSource for CalendlyClient {
    async fn fetch_event_types(&self) -> Result<Vec<CalendlyEventType>, CalendlyError> {
        let user_uri = self.current_user_uri().await?;
        let event_types = self.list_event_types(&user_uri).await?;
        info!("Fetched {} Calendly event types", event_types.len());
        Ok(event_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_api_token() {
        let config = CalendlyConfig::default();
        assert!(matches!(CalendlyClient::new(&config), Err(CalendlyError::MissingCredential)));

        let config = CalendlyConfig {
            api_token: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(CalendlyClient::new(&config), Err(CalendlyError::MissingCredential)));
    }

    #[test]
    fn builds_urls_from_base() {
        let config = CalendlyConfig {
            api_token: Some("tok".into()),
            api_base_url: "https://api.calendly.com/".into(),
            ..Default::default()
        };
        let client = CalendlyClient::new(&config).unwrap();
        assert_eq!(client.url("/users/me").unwrap().as_str(), "https://api.calendly.com/users/me");
    }
}
