//! # dochub-entity
//!
//! Domain entity models for DocHub. Every struct in this crate represents
//! a database row, a cached view, or a validated value object crossing the
//! HTTP boundary.

pub mod file;
pub mod listing;
pub mod user;

pub use file::{CreateFile, FileMeta, FileRecord, FileSummary, UploadMeta};
pub use listing::{FilterColumn, FilterValue, ListingFilter, ListingQuery};
pub use user::{CreateUser, User};
