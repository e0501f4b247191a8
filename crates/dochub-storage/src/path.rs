//! Deterministic blob path derivation.

use chrono::{DateTime, Utc};

use dochub_core::types::UserId;

/// Path of an uploaded blob: `{owner_id}/{unix_seconds}_{name}`.
///
/// Two uploads of the same name by the same owner within one second map to
/// the same path; the later write wins.
pub fn blob_path(owner: UserId, name: &str, created_at: DateTime<Utc>) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();
    format!("{owner}/{}_{sanitized}", created_at.timestamp())
}
