/// Local-disk storage rooted at a public directory
use crate::{object_path, validate_relative_path, FileStorage, MediaUpload, StorageResult};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        validate_relative_path(path)?;
        Ok(self.root.join(path))
    }
}

#[async_trait::async_trait]
impl FileStorage for LocalDiskStorage {
    async fn store(&self, directory: &str, upload: &MediaUpload) -> StorageResult<String> {
        let path = object_path(directory, upload);
        let full = self.resolve(&path)?;

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, &upload.bytes).await?;

        debug!(path = %path, bytes = upload.size(), "Stored file on local disk");
        Ok(path)
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => {
                debug!(path = %path, "Deleted file from local disk");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let full = self.resolve(path)?;
        Ok(tokio::fs::try_exists(&full).await?)
    }
}
