//! Cache provider trait for pluggable key-value backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for the shared key-value store (Redis or in-memory).
///
/// All values are strings. The provider is responsible for key prefixing
/// and TTL enforcement; keys passed in and returned from [`scan_prefix`]
/// are always the unprefixed logical keys.
///
/// Unreachable backends report [`crate::ErrorKind::CacheUnavailable`].
///
/// [`scan_prefix`]: CacheProvider::scan_prefix
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists in the cache.
    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Return every live key that starts with `prefix`.
    async fn scan_prefix(&self, prefix: &str) -> AppResult<Vec<String>>;

    /// Delete every key that starts with `prefix`, returning how many were removed.
    async fn delete_prefix(&self, prefix: &str) -> AppResult<u64> {
        let keys = self.scan_prefix(prefix).await?;
        let mut removed = 0u64;
        for key in &keys {
            self.delete(key).await?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Get a typed value by deserializing from JSON.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(value) => {
                let parsed = serde_json::from_str(&value)?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    async fn set_json<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.set(key, &json, ttl).await
    }

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
