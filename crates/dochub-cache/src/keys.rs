//! Cache key builders for all DocHub cache entries.
//!
//! Keys built here are logical; the provider applies the configured
//! deployment prefix (e.g. `dochub:`).

use sha2::{Digest, Sha256};

use dochub_core::result::AppResult;
use dochub_core::types::{FileId, UserId};
use dochub_entity::listing::ListingQuery;

/// Namespace shared by every listing entry; the bulk sweep scans it.
pub const LISTING_NAMESPACE: &str = "files:list:";

/// Namespace of revoked-token markers.
pub const REVOKED_NAMESPACE: &str = "revoked:";

// ── Per-file keys ──────────────────────────────────────────

/// Cache key for a file's metadata.
pub fn file_meta(file_id: FileId) -> String {
    format!("file:meta:{file_id}")
}

/// Cache key for a file's base64-encoded content.
pub fn file_content(file_id: FileId) -> String {
    format!("file:content:{file_id}")
}

/// Cache key for a file's attached JSON payload.
pub fn file_json(file_id: FileId) -> String {
    format!("file:json:{file_id}")
}

/// The three per-file keys, in the order they are removed on delete.
pub fn file_keys(file_id: FileId) -> [String; 3] {
    [file_meta(file_id), file_content(file_id), file_json(file_id)]
}

// ── Listing keys ───────────────────────────────────────────

/// Cache key for one listing view.
///
/// The query is encoded as canonical JSON and hashed, so every distinct
/// `(login, filter, limit)` combination gets its own entry and no raw
/// user input ends up in the key. A query that cannot be encoded gets no
/// key at all rather than one shared with other queries.
pub fn listing(user_id: UserId, query: &ListingQuery) -> AppResult<String> {
    let canonical = serde_json::to_string(query)?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(format!("{LISTING_NAMESPACE}{user_id}:{digest:x}"))
}

// ── Token keys ─────────────────────────────────────────────

/// Cache key for a revoked-token marker.
pub fn revoked_token(fingerprint: &str) -> String {
    format!("{REVOKED_NAMESPACE}{fingerprint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_keys() {
        assert_eq!(
            file_keys(FileId(7)),
            ["file:meta:7", "file:content:7", "file:json:7"]
        );
    }

    #[test]
    fn test_listing_key_is_namespaced_and_deterministic() {
        let query = ListingQuery {
            login: Some("bob_grantee".to_string()),
            filter: None,
            limit: Some(10),
        };
        let a = listing(UserId(3), &query).expect("key");
        let b = listing(UserId(3), &query.clone()).expect("key");
        assert_eq!(a, b);
        assert!(a.starts_with("files:list:3:"));
        // 64 hex characters of SHA-256.
        assert_eq!(a.len(), "files:list:3:".len() + 64);
    }

    #[test]
    fn test_listing_key_distinguishes_query_shape() {
        let base = ListingQuery::default();
        let limited = ListingQuery {
            limit: Some(1),
            ..ListingQuery::default()
        };
        let key = |user: i64, query: &ListingQuery| listing(UserId(user), query).expect("key");
        assert_ne!(key(1, &base), key(1, &limited));
        assert_ne!(key(1, &base), key(2, &base));
    }

    #[test]
    fn test_revoked_key() {
        assert_eq!(revoked_token("abc"), "revoked:abc");
    }
}
