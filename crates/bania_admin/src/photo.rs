//! Event photo pipeline: optional resize and JPEG recompression, file naming
//! and storage cleanup.

use bania_common::{BaniaError, HttpStatusCode};
use bania_config::PhotoConfig;
use bania_db::{PhotoStorage, StorageError};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("Missing file or eventId")]
    MissingField,

    #[error("Invalid eventId: {0}")]
    InvalidEventId(String),

    #[error("Unreadable image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Photo processing failed: {0}")]
    Processing(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<PhotoError> for BaniaError {
    fn from(err: PhotoError) -> Self {
        match err {
            PhotoError::MissingField | PhotoError::InvalidEventId(_) | PhotoError::Image(_) => {
                BaniaError::ValidationError(err.to_string())
            }
            PhotoError::Processing(msg) => BaniaError::InternalError(msg),
            PhotoError::Storage(e) => e.into(),
        }
    }
}

impl HttpStatusCode for PhotoError {
    fn status_code(&self) -> u16 {
        match self {
            PhotoError::MissingField | PhotoError::InvalidEventId(_) | PhotoError::Image(_) => 400,
            PhotoError::Processing(_) => 500,
            PhotoError::Storage(StorageError::ConfigError(_)) => 500,
            PhotoError::Storage(_) => 502,
        }
    }
}

/// An image ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPhoto {
    pub bytes: Vec<u8>,
    pub extension: String,
    pub content_type: String,
}

fn extension_of(file_name: &str) -> Option<&str> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// `{event_id}-{unix_millis}.{extension}`
pub fn photo_file_name(event_id: Uuid, unix_millis: i64, extension: &str) -> String {
    format!("{}-{}.{}", event_id, unix_millis, extension)
}

/// Storage file name of a public photo url (its last path segment).
pub fn file_name_from_url(url: &str) -> Option<&str> {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
}

/// Fits the image within `max_width` x `max_height` (never upscaling) and
/// re-encodes it as JPEG. With `resize` off the upload is stored as sent.
///
/// CPU bound; run it on the blocking pool.
pub fn prepare_photo(
    bytes: Vec<u8>,
    original_name: &str,
    content_type: Option<&str>,
    config: &PhotoConfig,
) -> Result<PreparedPhoto, PhotoError> {
    if !config.resize {
        let extension = extension_of(original_name).unwrap_or("bin").to_lowercase();
        let content_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or("application/octet-stream")
            .to_string();
        return Ok(PreparedPhoto {
            bytes,
            extension,
            content_type,
        });
    }

    let mut img = image::load_from_memory(&bytes)?;
    if img.width() > config.max_width || img.height() > config.max_height {
        debug!(
            "Resizing {}x{} photo to fit {}x{}",
            img.width(),
            img.height(),
            config.max_width,
            config.max_height
        );
        img = img.resize(config.max_width, config.max_height, FilterType::Lanczos3);
    }

    let quality = config.jpeg_quality.clamp(1, 100);
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))?;
    debug!("Recompressed photo from {} to {} bytes", bytes.len(), out.len());

    Ok(PreparedPhoto {
        bytes: out,
        extension: "jpg".to_string(),
        content_type: "image/jpeg".to_string(),
    })
}

/// Deletes the stored file behind `photo_url`. Failures are only logged.
pub async fn remove_stored_photo(storage: &dyn PhotoStorage, photo_url: &str) {
    let Some(file_name) = file_name_from_url(photo_url) else {
        return;
    };
    if let Err(e) = storage.remove(&[file_name.to_string()]).await {
        warn!("Failed to remove photo {} from storage: {}", file_name, e);
    }
}
