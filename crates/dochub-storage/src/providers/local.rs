//! Local filesystem storage provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::traits::storage::{ByteStream, StorageProvider};

/// Local filesystem storage provider.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored blobs.
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a relative path to an absolute path within the root.
    ///
    /// Paths that would escape the root are rejected.
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let clean = Path::new(path.trim_start_matches('/'));
        let escapes = clean
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || path.is_empty() {
            return Err(AppError::validation(format!("Invalid storage path: {path}")));
        }
        Ok(self.root.join(clean))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

fn io_error(action: &str, path: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Blob not found: {path}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to {action} blob: {path}"), e)
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn save(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data)
            .await
            .map_err(|e| io_error("write", path, e))?;

        debug!(path, bytes = data.len(), "Wrote blob");
        Ok(())
    }

    async fn open(&self, path: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(path)?;
        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| io_error("open", path, e))?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(Bytes::from))))
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(path)?;
        let data = fs::read(&full_path)
            .await
            .map_err(|e| io_error("read", path, e))?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        fs::remove_file(&full_path)
            .await
            .map_err(|e| io_error("delete", path, e))?;
        debug!(path, "Deleted blob");
        Ok(())
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        fs::try_exists(&full_path)
            .await
            .map_err(|e| io_error("stat", path, e))
    }
}
