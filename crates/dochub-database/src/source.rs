//! Source-of-truth contracts.
//!
//! Every failure of the underlying store surfaces as
//! [`ErrorKind::SourceUnavailable`](dochub_core::ErrorKind::SourceUnavailable);
//! there are no retries at this layer.

use async_trait::async_trait;

use dochub_core::result::AppResult;
use dochub_core::types::{FileId, UserId};
use dochub_entity::file::{CreateFile, FileMeta, FileRecord, FileSummary};
use dochub_entity::listing::ListingQuery;
use dochub_entity::user::{CreateUser, User};

/// Relational store of files and grants.
#[async_trait]
pub trait FileSource: Send + Sync + std::fmt::Debug + 'static {
    /// Load a file with its grant list and payload.
    async fn find_file(&self, id: FileId) -> AppResult<Option<FileRecord>>;

    /// List files visible to `user` under `query`, ordered by name then
    /// newest first.
    async fn list_files(&self, user: UserId, query: &ListingQuery) -> AppResult<Vec<FileSummary>>;

    /// Number of items [`list_files`](FileSource::list_files) would return.
    async fn count_files(&self, user: UserId, query: &ListingQuery) -> AppResult<u64>;

    /// Insert a file and its grants in one transaction.
    ///
    /// Grantee logins are resolved inside the transaction; an unknown login
    /// fails with `NotFound` and nothing is written.
    async fn create_file(&self, file: &CreateFile) -> AppResult<FileMeta>;

    /// Delete a file (grants cascade), returning its blob path if it existed.
    async fn delete_file(&self, id: FileId) -> AppResult<Option<String>>;

    /// Resolve a login to its user id.
    async fn find_user_id_by_login(&self, login: &str) -> AppResult<Option<UserId>>;
}

/// Relational store of registered users.
#[async_trait]
pub trait UserSource: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by exact login.
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>>;

    /// Create a user. A taken login fails with `Conflict`.
    async fn create_user(&self, user: &CreateUser) -> AppResult<User>;
}
