//! Document upload, listing, retrieval, and deletion.

pub mod service;

pub use service::{FileDocument, FileService};
