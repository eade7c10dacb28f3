/// File storage port for user uploads
///
/// Services store an upload and keep the returned relative path on the owning
/// row; the same path is later handed back to [`FileStorage::delete`]. Paths
/// look like `posts/3f2a...c9.jpg` regardless of backend.
use thiserror::Error;
use uuid::Uuid;

pub mod config;
pub mod local;
pub mod s3;

pub use config::S3Config;
pub use local::LocalDiskStorage;
pub use s3::S3Storage;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("S3 error: {0}")]
    S3(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A file received from a client, not yet persisted
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// File extension for the stored object, preferring the declared content type
    pub fn extension(&self) -> String {
        match self.content_type.as_str() {
            "image/jpeg" => "jpg".to_string(),
            "image/png" => "png".to_string(),
            "image/gif" => "gif".to_string(),
            _ => self
                .file_name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_lowercase())
                .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
                .unwrap_or_else(|| "bin".to_string()),
        }
    }
}

/// Path-based file storage
#[async_trait::async_trait]
pub trait FileStorage: Send + Sync {
    /// Persist `upload` under `directory`, returning the relative path
    async fn store(&self, directory: &str, upload: &MediaUpload) -> StorageResult<String>;

    /// Remove a previously stored file; missing files are not an error
    async fn delete(&self, path: &str) -> StorageResult<()>;

    /// Check whether a stored file exists
    async fn exists(&self, path: &str) -> StorageResult<bool>;
}

/// Generate a fresh object path: `{directory}/{uuid}.{ext}`
pub fn object_path(directory: &str, upload: &MediaUpload) -> String {
    format!(
        "{}/{}.{}",
        directory.trim_matches('/'),
        Uuid::new_v4().simple(),
        upload.extension()
    )
}

/// Reject absolute paths and parent-directory traversal
pub(crate) fn validate_relative_path(path: &str) -> StorageResult<()> {
    if path.is_empty()
        || path.starts_with('/')
        || path.split('/').any(|segment| segment == ".." || segment.is_empty())
    {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}
