//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dochub_core::types::UserId;

/// A registered DocHub user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name.
    pub login: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the user was registered.
    pub registered_at: DateTime<Utc>,
}

/// Data required to create a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Desired login.
    pub login: String,
    /// Pre-hashed password.
    pub password_hash: String,
}
