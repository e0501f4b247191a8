//! Application state shared across all handlers and extractors.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use dochub_cache::CacheManager;
use dochub_core::config::AppConfig;
use dochub_core::traits::storage::StorageProvider;
use dochub_service::{AuthService, FileService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Every field is
/// cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Document flows.
    pub files: FileService,
    /// Registration and token flows.
    pub auth: AuthService,
    /// Shared cache, probed by the health endpoint.
    pub cache: CacheManager,
    /// Blob storage, probed by the health endpoint.
    pub storage: Arc<dyn StorageProvider>,
    /// Fired on server shutdown; every request context is a child of it.
    pub shutdown: CancellationToken,
}
