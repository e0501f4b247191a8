//! Storage provider configuration.

use serde::{Deserialize, Serialize};

/// Blob storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root path for local file storage.
    #[serde(default = "default_root_path")]
    pub root_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
        }
    }
}

fn default_root_path() -> String {
    "./data/storage".to_string()
}
