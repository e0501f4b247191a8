//! PostgreSQL repositories.

pub mod file;
pub mod user;

pub use file::FileRepository;
pub use user::UserRepository;

use dochub_core::error::{AppError, ErrorKind};

/// Map a sqlx error to the source-of-truth error kind.
pub(crate) fn source_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::SourceUnavailable, format!("{context}: {e}"), e)
}
