//! Listing item returned by `GET /api/docs`.

use serde::{Deserialize, Serialize};

use dochub_core::types::{FileId, UserId};

use super::model::FileMeta;

/// Format used for the `created` field of listing items.
pub const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One document in a listing response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub id: FileId,
    pub name: String,
    pub mime: String,
    /// Always `true`; every document carries a file part.
    pub file: bool,
    pub public: bool,
    pub created: String,
    pub grant: Vec<UserId>,
}

impl From<&FileMeta> for FileSummary {
    fn from(meta: &FileMeta) -> Self {
        Self {
            id: meta.id,
            name: meta.name.clone(),
            mime: meta.mime_type.clone(),
            file: true,
            public: meta.is_public,
            created: meta.created_at.format(CREATED_FORMAT).to_string(),
            grant: meta.grants.clone(),
        }
    }
}
