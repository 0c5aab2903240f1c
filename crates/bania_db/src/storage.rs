//! Photo storage backed by the Supabase Storage REST API.

use async_trait::async_trait;
use bania_common::{external_service_error, BaniaError, HTTP_CLIENT};
use bania_config::SupabaseConfig;
use reqwest::Client;
use serde_json::json;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, error, info};

/// Value sent as `cache-control` on uploads (seconds).
pub const CACHE_CONTROL_SECS: u32 = 3600;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Storage API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Storage configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for BaniaError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConfigError(msg) => BaniaError::ConfigError(msg),
            other => external_service_error("Supabase Storage", other),
        }
    }
}

#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Stores (or overwrites) `file_name` in the photo bucket.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    /// Public URL for a stored file. Does not check that the file exists.
    fn public_url(&self, file_name: &str) -> String;

    async fn remove(&self, file_names: &[String]) -> Result<(), StorageError>;
}

/// Which key a storage client authenticates with.
///
/// `Anon` clients only build public URLs; uploads and deletes need the
/// service-role key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRole {
    Anon,
    ServiceRole,
}

#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    bucket: String,
    role: ClientRole,
    key: Option<String>,
}

impl SupabaseStorage {
    pub fn new(config: &SupabaseConfig, role: ClientRole) -> Result<Self, StorageError> {
        Self::with_client(HTTP_CLIENT.clone(), config, role)
    }

    pub fn with_client(
        client: Client,
        config: &SupabaseConfig,
        role: ClientRole,
    ) -> Result<Self, StorageError> {
        let base_url = config
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| StorageError::ConfigError("Supabase url is not set".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let key = match role {
            ClientRole::Anon => config.anon_key.clone(),
            ClientRole::ServiceRole => Some(config.service_role_key.clone().ok_or_else(|| {
                StorageError::ConfigError("Supabase service role key is not set".to_string())
            })?),
        };

        Ok(Self {
            client,
            base_url,
            bucket: config.photo_bucket.clone(),
            role,
            key,
        })
    }

    pub fn role(&self) -> ClientRole {
        self.role
    }

    fn write_key(&self) -> Result<&str, StorageError> {
        match (self.role, self.key.as_deref()) {
            (ClientRole::ServiceRole, Some(key)) => Ok(key),
            _ => Err(StorageError::ConfigError(
                "storage writes require a service role client".to_string(),
            )),
        }
    }

    async fn check(response: reqwest::Response) -> Result<(), StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        error!("Storage API returned {}: {}", status, message);
        Err(StorageError::ApiError {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PhotoStorage for SupabaseStorage {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        let key = self.write_key()?;
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, file_name);
        debug!("Uploading {} bytes to {}", bytes.len(), url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .header("apikey", key)
            .header("x-upsert", "true")
            .header("cache-control", format!("max-age={}", CACHE_CONTROL_SECS))
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await?;
        info!("Uploaded photo {}", file_name);
        Ok(())
    }

    fn public_url(&self, file_name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, file_name
        )
    }

    async fn remove(&self, file_names: &[String]) -> Result<(), StorageError> {
        let key = self.write_key()?;
        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(key)
            .header("apikey", key)
            .json(&json!({ "prefixes": file_names }))
            .send()
            .await?;
        Self::check(response).await
    }
}

/// Process-local storage used when Supabase is not configured.
#[derive(Debug)]
pub struct MemoryStorage {
    public_base: String,
    files: RwLock<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryStorage {
    pub fn new(public_base: impl Into<String>) -> Self {
        Self {
            public_base: public_base.into().trim_end_matches('/').to_string(),
            files: RwLock::new(HashMap::new()),
        }
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.files
            .read()
            .map(|f| f.contains_key(file_name))
            .unwrap_or(false)
    }

    /// Stored bytes and content type.
    pub fn get(&self, file_name: &str) -> Option<(Vec<u8>, String)> {
        self.files.read().ok().and_then(|f| f.get(file_name).cloned())
    }

    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .files
            .read()
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

#[async_trait]
impl PhotoStorage for MemoryStorage {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        let mut files = self
            .files
            .write()
            .map_err(|_| StorageError::ConfigError("storage lock poisoned".to_string()))?;
        files.insert(file_name.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_base, file_name)
    }

    async fn remove(&self, file_names: &[String]) -> Result<(), StorageError> {
        let mut files = self
            .files
            .write()
            .map_err(|_| StorageError::ConfigError("storage lock poisoned".to_string()))?;
        for name in file_names {
            files.remove(name);
        }
        Ok(())
    }
}
