/// Image loader
///
/// Fetches the bytes behind an image reference and decodes them to RGBA.
/// Remote references go through HTTP, everything else is read from disk.
/// Tray previews are decoded as bounded thumbnails; only images placed
/// in the grid are kept at full resolution.

use std::future::Future;
use std::time::Duration;

use image::imageops::FilterType;
use reqwest::Client;
use thiserror::Error;
use tokio::task;

use crate::state::data::ImageRef;
use crate::state::images::{Fidelity, LoadedImage};

/// Timeout for a single HTTP request
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest side of a tray thumbnail
pub const THUMBNAIL_SIZE: u32 = 256;

/// Errors that can occur while loading an image
///
/// String payloads keep the error `Clone` so it can travel in a `Message`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// HTTP request could not be made
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Local file could not be read
    #[error("I/O error: {0}")]
    Io(String),

    /// Bytes are not a decodable image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Background decode task died
    #[error("Task join error: {0}")]
    Join(String),
}

/// Loads image references, sharing one HTTP connection pool
#[derive(Debug, Clone, Default)]
pub struct Loader {
    client: Option<Client>,
}

impl Loader {
    pub fn new() -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| LoadError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client: Some(client),
        })
    }

    /// Loader for local files only; remote references fail
    pub fn offline() -> Self {
        Self::default()
    }

    /// Load and decode the image behind `reference`
    pub fn load(
        &self,
        reference: ImageRef,
        fidelity: Fidelity,
    ) -> impl Future<Output = Result<LoadedImage, LoadError>> + Send + 'static {
        let client = self.client.clone();
        async move {
            let bytes = read_bytes(client.as_ref(), &reference).await?;

            // Decoding is CPU-bound, keep it off the UI executor
            let image = task::spawn_blocking(move || decode(&bytes, fidelity))
                .await
                .map_err(|e| LoadError::Join(e.to_string()))??;

            log::debug!(
                "📷 Loaded {} ({}x{}, {:?})",
                reference,
                image.width(),
                image.height(),
                fidelity
            );
            Ok(image)
        }
    }
}

async fn read_bytes(client: Option<&Client>, reference: &ImageRef) -> Result<Vec<u8>, LoadError> {
    if reference.is_remote() {
        let client =
            client.ok_or_else(|| LoadError::Network("HTTP client unavailable".to_string()))?;
        return fetch_remote(client, reference.as_str()).await;
    }

    let path = reference
        .local_path()
        .ok_or_else(|| LoadError::Io(format!("{}: not a valid file URL", reference)))?;
    tokio::fs::read(&path)
        .await
        .map_err(|e| LoadError::Io(format!("{}: {}", path.display(), e)))
}

async fn fetch_remote(client: &Client, url: &str) -> Result<Vec<u8>, LoadError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| LoadError::Network(format!("HTTP GET failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status(status.as_u16()));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| LoadError::Network(format!("Failed to read response body: {}", e)))?;
    Ok(body.to_vec())
}

/// Decode encoded image bytes (format guessed from content)
pub fn decode(bytes: &[u8], fidelity: Fidelity) -> Result<LoadedImage, LoadError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| LoadError::Decode(e.to_string()))?;

    let decoded = match fidelity {
        Fidelity::Thumbnail
            if decoded.width() > THUMBNAIL_SIZE || decoded.height() > THUMBNAIL_SIZE =>
        {
            decoded.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3)
        }
        _ => decoded,
    };

    Ok(LoadedImage::from_rgba(decoded.into_rgba8()))
}
