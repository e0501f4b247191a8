//! # dochub-auth
//!
//! Bearer token lifecycle and authorization for DocHub.
//!
//! ## Modules
//!
//! - `jwt` — token issuance, verification, fingerprinting, and distributed revocation
//! - `acl` — the per-file access decision
//! - `password` — Argon2id password hashing

pub mod acl;
pub mod jwt;
pub mod password;

pub use acl::AccessGate;
pub use jwt::{Claims, RevocationStore, TokenAuthority};
pub use password::PasswordHasher;
