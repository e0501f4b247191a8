//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token signing and registration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for JWT signing (HMAC-SHA512).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in hours.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
    /// Administrative token required to register new users.
    #[serde(default = "default_admin_token")]
    pub admin_token: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl(),
            admin_token: default_admin_token(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_token_ttl() -> u64 {
    24 * 7
}

fn default_admin_token() -> String {
    "CHANGE_ME_ADMIN_TOKEN".to_string()
}
