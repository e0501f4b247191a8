//! # dochub-database
//!
//! PostgreSQL connection management, embedded migrations, and the
//! repositories that make up DocHub's source of truth. The [`FileSource`]
//! and [`UserSource`] traits are the seams the service layer depends on.

pub mod connection;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod source;

pub use connection::DatabasePool;
pub use repositories::{FileRepository, UserRepository};
pub use source::{FileSource, UserSource};
