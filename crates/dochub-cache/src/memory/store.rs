//! In-memory cache implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use dochub_core::config::cache::MemoryCacheConfig;
use dochub_core::result::AppResult;
use dochub_core::traits::cache::CacheProvider;

use crate::keys::REVOKED_NAMESPACE;

/// A cached value together with the TTL it was written with.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expiry policy that honours the TTL of each individual write.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory cache provider using moka.
///
/// Process-local: revocations and invalidations written here are not seen
/// by other instances.
///
/// Revocation markers live in a separate cache with no capacity bound.
/// They leave only when their TTL runs out, never to make room for file
/// or listing entries.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    cache: Cache<String, Entry>,
    revoked: Cache<String, Entry>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        let revoked = Cache::builder().expire_after(PerEntryTtl).build();

        Self { cache, revoked }
    }

    fn store_for(&self, key: &str) -> &Cache<String, Entry> {
        if key.starts_with(REVOKED_NAMESPACE) {
            &self.revoked
        } else {
            &self.cache
        }
    }
}

impl Default for MemoryCacheProvider {
    fn default() -> Self {
        Self::new(&MemoryCacheConfig::default())
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.store_for(key).get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.store_for(key)
            .insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.store_for(key).remove(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.store_for(key).get(key).await.is_some())
    }

    async fn scan_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        let keys: Vec<String> = self
            .cache
            .iter()
            .chain(self.revoked.iter())
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.to_string())
            .collect();

        debug!(prefix, count = keys.len(), "Scanned keys by prefix");
        Ok(keys)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_provider() -> MemoryCacheProvider {
        MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 })
    }

    #[tokio::test]
    async fn test_set_get() {
        let provider = make_provider();
        provider
            .set("key1", "value1", Duration::from_secs(60))
            .await
            .unwrap();
        let val = provider.get("key1").await.unwrap();
        assert_eq!(val, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_entry_expires_after_its_own_ttl() {
        let provider = make_provider();
        provider
            .set("short", "v", Duration::from_millis(150))
            .await
            .unwrap();
        provider
            .set("long", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(provider.get("short").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(provider.get("short").await.unwrap(), None);
        assert!(provider.get("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete() {
        let provider = make_provider();
        provider
            .set("key2", "value2", Duration::from_secs(60))
            .await
            .unwrap();
        provider.delete("key2").await.unwrap();
        assert_eq!(provider.get("key2").await.unwrap(), None);
        // Deleting a missing key is fine.
        provider.delete("key2").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_prefix_leaves_other_namespaces() {
        let provider = make_provider();
        let ttl = Duration::from_secs(60);
        provider.set("files:list:1:aa", "[]", ttl).await.unwrap();
        provider.set("files:list:2:bb", "[]", ttl).await.unwrap();
        provider.set("file:meta:1", "{}", ttl).await.unwrap();

        let removed = provider.delete_prefix("files:list:").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(provider.get("files:list:1:aa").await.unwrap(), None);
        assert!(provider.get("file:meta:1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_revocation_survives_capacity_pressure() {
        let provider = MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 10 });
        let ttl = Duration::from_secs(60);
        provider.set("revoked:abc", "1", ttl).await.unwrap();

        for round in 0..5 {
            for i in 0..100 {
                let key = format!("file:meta:{i}");
                provider.set(&key, "{}", ttl).await.unwrap();
                provider.get(&key).await.unwrap();
            }
            provider.set(&format!("files:list:{round}:aa"), "[]", ttl).await.unwrap();
        }
        provider.cache.run_pending_tasks().await;

        assert!(provider.cache.entry_count() <= 10);
        assert_eq!(provider.get("revoked:abc").await.unwrap(), Some("1".to_string()));
        assert!(provider.exists("revoked:abc").await.unwrap());
        assert_eq!(provider.scan_prefix("revoked:").await.unwrap(), vec!["revoked:abc".to_string()]);
    }

    #[tokio::test]
    async fn test_revocation_still_expires() {
        let provider = make_provider();
        provider
            .set("revoked:short", "1", Duration::from_millis(150))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(provider.get("revoked:short").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_json_roundtrip() {
        let provider = make_provider();
        let data = serde_json::json!({"name": "test", "count": 42});
        provider
            .set_json("json_key", &data, Duration::from_secs(60))
            .await
            .unwrap();
        let result: Option<serde_json::Value> = provider.get_json("json_key").await.unwrap();
        assert_eq!(result, Some(data));
    }

    #[tokio::test]
    async fn test_health_check() {
        let provider = make_provider();
        assert!(provider.health_check().await.unwrap());
    }
}
