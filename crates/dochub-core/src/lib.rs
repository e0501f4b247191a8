//! # dochub-core
//!
//! Core crate for DocHub. Contains the unified error system, configuration
//! schemas, typed identifiers, the clock abstraction, and the seam traits
//! that the cache and blob-storage backends implement.
//!
//! This crate has **no** internal dependencies on other DocHub crates.

pub mod clock;
pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
