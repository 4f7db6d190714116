//! Product image hosting.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageHostError {
    #[error("empty image upload")]
    Empty,

    #[error("image host unavailable: {0}")]
    Unavailable(String),
}

/// One uploaded file as received from a client.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl core::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Stores an image and returns the public URL it is reachable at.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageHostError>;
}

#[async_trait]
impl<S> ImageHost for Arc<S>
where
    S: ImageHost + ?Sized,
{
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageHostError> {
        (**self).upload(image).await
    }
}

/// Keeps uploads in memory under `memory://images/<uuid>/<file_name>` URLs.
#[derive(Debug, Default)]
pub struct InMemoryImageHost {
    images: RwLock<HashMap<String, ImageUpload>>,
}

impl InMemoryImageHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<ImageUpload> {
        self.images.read().ok()?.get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.images.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keep only characters that are safe inside a URL path segment.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "image".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl ImageHost for InMemoryImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageHostError> {
        if image.bytes.is_empty() {
            return Err(ImageHostError::Empty);
        }

        let url = format!(
            "memory://images/{}/{}",
            Uuid::now_v7(),
            sanitize_file_name(&image.file_name)
        );
        let mut images = self
            .images
            .write()
            .map_err(|_| ImageHostError::Unavailable("lock poisoned".to_string()))?;
        images.insert(url.clone(), image);
        tracing::debug!(%url, "stored image in memory");
        Ok(url)
    }
}
