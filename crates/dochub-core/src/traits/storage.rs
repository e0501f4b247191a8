//! Storage provider trait for durable blob storage.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for blob storage backends.
///
/// Paths are relative to the provider root. Implementations live in
/// `dochub-storage`.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write bytes to a blob at the given path, creating parent directories.
    async fn save(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Open a blob for streaming.
    async fn open(&self, path: &str) -> AppResult<ByteStream>;

    /// Read a blob into memory.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Delete a blob. Missing blobs are reported as `NotFound`.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Check whether a blob exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;
}
