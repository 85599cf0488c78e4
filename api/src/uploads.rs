//! Header-image uploads for the email composer

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Only image files can be uploaded")]
    NotAnImage,
    #[error("Image must be 5 MB or smaller")]
    TooLarge,
    #[error("No file provided")]
    MissingFile,
    #[error("storage error: {0}")]
    Storage(String),
}

/// Constraints checked before anything is stored
pub fn check_upload(content_type: Option<&str>, size: usize) -> Result<(), UploadError> {
    if !content_type.is_some_and(|ct| ct.starts_with("image/")) {
        return Err(UploadError::NotAnImage);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge);
    }
    if size == 0 {
        return Err(UploadError::MissingFile);
    }
    Ok(())
}

fn stored_name(file_name: &str) -> String {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{}{}", Uuid::new_v4().simple(), extension)
}

/// File storage port; returns the public URL
#[async_trait]
pub trait UploadStore: Send + Sync {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError>;
}

/// Writes into a directory served under `base_url`
pub struct LocalUploadStore {
    dir: PathBuf,
    base_url: String,
}

impl LocalUploadStore {
    pub fn new(dir: impl Into<PathBuf>, base_url: &str) -> Self {
        Self { dir: dir.into(), base_url: base_url.trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl UploadStore for LocalUploadStore {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let name = stored_name(file_name);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| UploadError::Storage(e.to_string()))?;
        tokio::fs::write(self.dir.join(&name), bytes)
            .await
            .map_err(|e| UploadError::Storage(e.to_string()))?;
        tracing::info!(file = %name, size = bytes.len(), "stored upload");
        Ok(format!("{}/{}", self.base_url, name))
    }
}

/// Keeps uploads in memory (for testing and development)
#[derive(Default)]
pub struct InMemoryUploadStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryUploadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

#[async_trait]
impl UploadStore for InMemoryUploadStore {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let name = stored_name(file_name);
        self.files.write().insert(name.clone(), bytes.to_vec());
        Ok(format!("memory://uploads/{name}"))
    }
}
