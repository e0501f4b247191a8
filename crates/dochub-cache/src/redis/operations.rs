//! Redis cache provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::traits::cache::CacheProvider;

use super::client::RedisClient;

/// Number of keys requested per `SCAN` round trip.
const SCAN_BATCH: usize = 100;

/// Redis-backed cache provider, shared by every DocHub instance.
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    client: RedisClient,
}

impl RedisCacheProvider {
    /// Create a new Redis cache provider.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::CacheUnavailable, format!("Redis error: {e}"), e)
    }

    /// Walk the keyspace with `SCAN`, returning full (prefixed) keys.
    async fn scan_full_keys(&self, prefix: &str) -> AppResult<Vec<String>> {
        let pattern = format!("{}*", self.client.prefixed_key(prefix));
        let mut conn = self.client.conn_mut();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(Self::map_err)?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once.
        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: Option<String> = conn.get(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        // SETEX rejects a zero TTL.
        let seconds = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(&full_key, value, seconds)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn.del(&full_key).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: bool = conn.exists(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn scan_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        let keys = self.scan_full_keys(prefix).await?;
        Ok(keys
            .iter()
            .filter_map(|k| self.client.logical_key(k))
            .map(str::to_string)
            .collect())
    }

    async fn delete_prefix(&self, prefix: &str) -> AppResult<u64> {
        let keys = self.scan_full_keys(prefix).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.client.conn_mut();
        let count: u64 = conn.del(&keys).await.map_err(Self::map_err)?;

        debug!(prefix, count, "Deleted keys matching prefix");
        Ok(count)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
