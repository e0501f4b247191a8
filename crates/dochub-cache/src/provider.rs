//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use dochub_core::config::cache::CacheConfig;
use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::traits::cache::CacheProvider;

/// Cache manager that wraps the configured cache provider.
///
/// The provider is selected at construction time based on configuration.
/// Cloning is cheap; all clones share the same backend.
#[derive(Debug, Clone)]
pub struct CacheManager {
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        let inner: Arc<dyn CacheProvider> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis cache provider");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisCacheProvider::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory cache provider");
                Arc::new(crate::memory::MemoryCacheProvider::new(&config.memory))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a cache manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn CacheProvider>) -> Self {
        Self { inner: provider }
    }

    /// Create a cache manager backed by a fresh in-memory provider.
    #[cfg(feature = "memory")]
    pub fn in_memory() -> Self {
        Self::from_provider(Arc::new(crate::memory::MemoryCacheProvider::default()))
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    async fn scan_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        self.inner.scan_prefix(prefix).await
    }

    async fn delete_prefix(&self, prefix: &str) -> AppResult<u64> {
        self.inner.delete_prefix(prefix).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dochub_core::ErrorKind;

    #[tokio::test]
    async fn test_unknown_provider_is_configuration_error() {
        let config = CacheConfig {
            provider: "memcached".to_string(),
            ..CacheConfig::default()
        };
        let err = CacheManager::new(&config).await.expect_err("unknown provider");
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_memory_provider_from_config() {
        let config = CacheConfig {
            provider: "memory".to_string(),
            ..CacheConfig::default()
        };
        let cache = CacheManager::new(&config).await.expect("memory cache");
        cache
            .set("k", "v", Duration::from_secs(5))
            .await
            .expect("set");
        assert_eq!(cache.get("k").await.expect("get"), Some("v".to_string()));
        assert!(cache.health_check().await.expect("health"));
    }
}
