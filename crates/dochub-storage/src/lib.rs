//! # dochub-storage
//!
//! Durable blob storage for uploaded document content. The relational
//! store records each blob's path; this crate only moves bytes.

pub mod path;
pub mod providers;

pub use path::blob_path;
pub use providers::local::LocalStorageProvider;
