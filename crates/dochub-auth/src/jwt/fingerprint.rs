//! One-way token fingerprints.

use sha2::{Digest, Sha256};

/// Hex SHA-256 of the token string.
///
/// Revocation records are keyed by fingerprint so the shared store never
/// holds a usable credential.
pub fn fingerprint(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
