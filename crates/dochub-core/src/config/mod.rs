//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! `config/default.toml`, an environment overlay, and `DOCHUB__*` variables.
//! Each sub-module represents a logical configuration section.

pub mod app;
pub mod auth;
pub mod cache;
pub mod database;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::cache::{CacheConfig, MemoryCacheConfig, RedisCacheConfig};
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Token and registration settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `DOCHUB__`, for example
    /// `DOCHUB__AUTH__JWT_SECRET`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DOCHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
