//! Distributed revocation records.

use std::time::Duration;

use tracing::{debug, error};

use dochub_cache::keys;
use dochub_cache::provider::CacheManager;
use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::traits::CacheProvider;

/// Marker value stored for a revoked fingerprint.
const REVOKED_MARKER: &str = "1";

/// Revoked-token fingerprints in the shared store.
///
/// Records expire on their own once the token would have expired anyway.
/// Store failures surface as `ServiceUnavailable`: a token is never reported
/// as unrevoked without an answer from the store.
#[derive(Debug, Clone)]
pub struct RevocationStore {
    cache: CacheManager,
}

impl RevocationStore {
    /// Create a revocation store over the shared cache.
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }

    /// Whether a record exists for `fingerprint`.
    pub async fn is_revoked(&self, fingerprint: &str) -> AppResult<bool> {
        self.cache
            .exists(&keys::revoked_token(fingerprint))
            .await
            .map_err(|e| {
                error!(error = %e, "Revocation lookup failed");
                AppError::with_source(
                    ErrorKind::ServiceUnavailable,
                    "Revocation store is unavailable",
                    e,
                )
            })
    }

    /// Record `fingerprint` as revoked for `ttl`.
    pub async fn revoke(&self, fingerprint: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .set(&keys::revoked_token(fingerprint), REVOKED_MARKER, ttl)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to write revocation record");
                AppError::with_source(
                    ErrorKind::ServiceUnavailable,
                    "Revocation store is unavailable",
                    e,
                )
            })?;
        debug!(ttl_seconds = ttl.as_secs(), "Recorded token revocation");
        Ok(())
    }
}
