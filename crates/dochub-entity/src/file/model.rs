//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dochub_core::types::{FileId, UserId};

/// Authoritative metadata of a stored document.
///
/// This is the value cached under the `file:meta:{id}` key. It carries
/// everything the access gate needs, so a cached read can be authorized
/// without touching the relational store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Unique file identifier.
    pub id: FileId,
    /// The file name as uploaded.
    pub name: String,
    /// MIME type of the content.
    pub mime_type: String,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// The uploading user.
    pub owner_id: UserId,
    /// Login of the uploading user.
    pub owner_login: String,
    /// Whether any authenticated user may read the file.
    pub is_public: bool,
    /// Users explicitly granted read access.
    #[serde(default)]
    pub grants: Vec<UserId>,
    /// When the file was uploaded.
    pub created_at: DateTime<Utc>,
    /// Path of the blob within the storage provider.
    pub storage_path: String,
}

impl FileMeta {
    /// Check if the given user owns this file.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Check if the given user appears in the grant list.
    pub fn is_granted_to(&self, user_id: UserId) -> bool {
        self.grants.contains(&user_id)
    }
}

/// A file row together with its optional attached JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Metadata used for authorization and listing.
    #[serde(flatten)]
    pub meta: FileMeta,
    /// Arbitrary JSON attached at upload time.
    pub json_data: Option<serde_json::Value>,
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// The file name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// The uploading user.
    pub owner_id: UserId,
    /// Whether the file is public.
    pub is_public: bool,
    /// Logins of grantees, resolved to user IDs inside the insert transaction.
    pub grant_logins: Vec<String>,
    /// Upload timestamp; also part of the blob path.
    pub created_at: DateTime<Utc>,
    /// Path of the blob within the storage provider.
    pub storage_path: String,
    /// Optional attached JSON payload.
    pub json_data: Option<serde_json::Value>,
}
