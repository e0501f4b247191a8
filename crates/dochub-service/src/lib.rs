//! # dochub-service
//!
//! Business logic service layer for DocHub. Each service orchestrates the
//! source of truth, the cache layer, blob storage, and token authority to
//! implement one group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references or cheap clones.

pub mod auth;
pub mod context;
pub mod file;

pub use auth::AuthService;
pub use context::RequestContext;
pub use file::{FileDocument, FileService};
