//! Read-through, write-invalidate cache over per-file and listing views.
//!
//! The layer never fails a request: an unreachable store is logged and
//! behaves as a miss (reads) or a no-op (writes and invalidations), and a
//! value that no longer deserializes is treated as a miss. The relational
//! store stays the only record of truth.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use dochub_core::config::cache::CacheConfig;
use dochub_core::traits::cache::CacheProvider;
use dochub_core::types::{FileId, UserId};
use dochub_entity::file::{FileMeta, FileSummary};
use dochub_entity::listing::ListingQuery;

use crate::keys;
use crate::provider::CacheManager;

/// Typed cache façade used by the file service.
#[derive(Debug, Clone)]
pub struct CacheLayer {
    cache: CacheManager,
    file_ttl: Duration,
    listing_ttl: Duration,
}

impl CacheLayer {
    /// Create a cache layer with TTLs from configuration.
    pub fn new(cache: CacheManager, config: &CacheConfig) -> Self {
        Self::with_ttls(
            cache,
            Duration::from_secs(config.file_ttl_seconds),
            Duration::from_secs(config.listing_ttl_seconds),
        )
    }

    /// Create a cache layer with explicit TTLs.
    pub fn with_ttls(cache: CacheManager, file_ttl: Duration, listing_ttl: Duration) -> Self {
        Self {
            cache,
            file_ttl,
            listing_ttl,
        }
    }

    /// The underlying cache manager.
    pub fn manager(&self) -> &CacheManager {
        &self.cache
    }

    // ── Raw access ─────────────────────────────────────────

    /// Read a raw value. Store failures count as a miss.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.cache.get(key).await {
            Ok(Some(value)) => {
                debug!(key, "Cache hit");
                Some(value)
            }
            Ok(None) => {
                debug!(key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Write a raw value unless `cancel` has fired. Store failures are logged.
    pub async fn put(&self, key: &str, value: &str, ttl: Duration, cancel: &CancellationToken) {
        if cancel.is_cancelled() {
            debug!(key, "Skipping cache fill for cancelled request");
            return;
        }
        if let Err(e) = self.cache.set(key, value, ttl).await {
            warn!(key, error = %e, "Cache write failed");
        }
    }

    async fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Cached value does not deserialize, treating as miss");
                None
            }
        }
    }

    async fn put_typed<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        cancel: &CancellationToken,
    ) {
        match serde_json::to_string(value) {
            Ok(raw) => self.put(key, &raw, ttl, cancel).await,
            Err(e) => warn!(key, error = %e, "Failed to serialize value for cache"),
        }
    }

    // ── Per-file views ─────────────────────────────────────

    /// Cached metadata of a file.
    pub async fn get_meta(&self, file_id: FileId) -> Option<FileMeta> {
        self.get_typed(&keys::file_meta(file_id)).await
    }

    /// Cache the metadata of a file.
    pub async fn put_meta(&self, meta: &FileMeta, cancel: &CancellationToken) {
        self.put_typed(&keys::file_meta(meta.id), meta, self.file_ttl, cancel)
            .await;
    }

    /// Cached content of a file.
    pub async fn get_content(&self, file_id: FileId) -> Option<Bytes> {
        let key = keys::file_content(file_id);
        let raw = self.get(&key).await?;
        match BASE64.decode(raw.as_bytes()) {
            Ok(bytes) => Some(Bytes::from(bytes)),
            Err(e) => {
                warn!(key, error = %e, "Cached content is not valid base64, treating as miss");
                None
            }
        }
    }

    /// Cache the content of a file.
    pub async fn put_content(&self, file_id: FileId, content: &[u8], cancel: &CancellationToken) {
        let encoded = BASE64.encode(content);
        self.put(&keys::file_content(file_id), &encoded, self.file_ttl, cancel)
            .await;
    }

    /// Cached JSON payload of a file. `Some(Value::Null)` records a file
    /// that has no payload.
    pub async fn get_json(&self, file_id: FileId) -> Option<serde_json::Value> {
        self.get_typed(&keys::file_json(file_id)).await
    }

    /// Cache the JSON payload of a file.
    pub async fn put_json(
        &self,
        file_id: FileId,
        payload: &serde_json::Value,
        cancel: &CancellationToken,
    ) {
        self.put_typed(&keys::file_json(file_id), payload, self.file_ttl, cancel)
            .await;
    }

    /// Fill every per-file view after a source read.
    ///
    /// Content and payload go in before metadata, so a metadata hit means
    /// the rest of the fill was attempted. A cancellation between writes
    /// leaves at most the earlier parts behind, never a metadata entry
    /// without them. A file without a payload caches JSON `null`.
    pub async fn put_file(
        &self,
        meta: &FileMeta,
        content: &[u8],
        payload: Option<&serde_json::Value>,
        cancel: &CancellationToken,
    ) {
        self.put_content(meta.id, content, cancel).await;
        let payload = payload.unwrap_or(&serde_json::Value::Null);
        self.put_json(meta.id, payload, cancel).await;
        self.put_meta(meta, cancel).await;
    }

    // ── Listing views ──────────────────────────────────────

    /// Cached listing for a user and query.
    pub async fn get_listing(&self, user_id: UserId, query: &ListingQuery) -> Option<Vec<FileSummary>> {
        let key = self.listing_key(user_id, query)?;
        self.get_typed(&key).await
    }

    /// Cache a listing for a user and query.
    pub async fn put_listing(
        &self,
        user_id: UserId,
        query: &ListingQuery,
        docs: &[FileSummary],
        cancel: &CancellationToken,
    ) {
        if let Some(key) = self.listing_key(user_id, query) {
            self.put_typed(&key, &docs, self.listing_ttl, cancel).await;
        }
    }

    fn listing_key(&self, user_id: UserId, query: &ListingQuery) -> Option<String> {
        keys::listing(user_id, query)
            .inspect_err(|e| warn!(user_id = %user_id, error = %e, "Listing query has no cache key"))
            .ok()
    }

    // ── Invalidation ───────────────────────────────────────

    /// Remove exactly the three per-file keys of `file_id`.
    pub async fn invalidate_file(&self, file_id: FileId) {
        for key in keys::file_keys(file_id) {
            if let Err(e) = self.cache.delete(&key).await {
                warn!(key, error = %e, "Cache invalidation failed");
            }
        }
    }

    /// Drop every cached listing, for every user and query shape.
    ///
    /// Listing keys are not addressable by file, so any change to the file
    /// set sweeps the whole namespace.
    pub async fn sweep_listings(&self) -> u64 {
        match self.cache.delete_prefix(keys::LISTING_NAMESPACE).await {
            Ok(count) => {
                debug!(count, "Swept listing cache");
                count
            }
            Err(e) => {
                warn!(error = %e, "Listing sweep failed");
                0
            }
        }
    }

    /// Invalidation after a committed delete.
    pub async fn invalidate_after_delete(&self, file_id: FileId) {
        self.invalidate_file(file_id).await;
        self.sweep_listings().await;
    }

    /// Invalidation after a committed create.
    pub async fn invalidate_after_create(&self) {
        self.sweep_listings().await;
    }
}
