//! In-process source of truth.
//!
//! Mirrors the PostgreSQL repositories closely enough for service and HTTP
//! tests: the same visibility rules, ordering, grant resolution, and
//! all-or-nothing inserts. Not meant for multi-instance deployments.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{FileId, UserId};
use dochub_entity::file::{CreateFile, FileMeta, FileRecord, FileSummary};
use dochub_entity::listing::{FilterColumn, FilterValue, ListingQuery};
use dochub_entity::user::{CreateUser, User};

use crate::source::{FileSource, UserSource};

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<UserId, User>,
    files: BTreeMap<FileId, FileRecord>,
    next_user_id: i64,
    next_file_id: i64,
}

impl MemoryState {
    fn user_by_login(&self, login: &str) -> Option<&User> {
        self.users.values().find(|u| u.login == login)
    }

    fn visible(&self, user: UserId, query: &ListingQuery) -> Vec<&FileMeta> {
        let mut metas: Vec<&FileMeta> = self
            .files
            .values()
            .map(|record| &record.meta)
            .filter(|meta| {
                meta.is_owned_by(user) || (query.includes_grants() && meta.is_granted_to(user))
            })
            .filter(|meta| match &query.filter {
                None => true,
                Some(filter) => match (&filter.column, &filter.value) {
                    (FilterColumn::FileName, FilterValue::Text(v)) => &meta.name == v,
                    (FilterColumn::MimeType, FilterValue::Text(v)) => &meta.mime_type == v,
                    (FilterColumn::CreatedAt, FilterValue::Date(d)) => {
                        meta.created_at.date_naive() == *d
                    }
                    _ => false,
                },
            })
            .collect();

        metas.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        if let Some(limit) = query.limit {
            metas.truncate(limit as usize);
        }
        metas
    }
}

/// In-memory implementation of [`FileSource`] and [`UserSource`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `SourceUnavailable` (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of file rows currently stored.
    pub async fn file_count(&self) -> usize {
        self.state.lock().await.files.len()
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::source_unavailable("Source of truth is unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl FileSource for MemoryStore {
    async fn find_file(&self, id: FileId) -> AppResult<Option<FileRecord>> {
        self.ensure_available()?;
        Ok(self.state.lock().await.files.get(&id).cloned())
    }

    async fn list_files(&self, user: UserId, query: &ListingQuery) -> AppResult<Vec<FileSummary>> {
        self.ensure_available()?;
        let state = self.state.lock().await;
        Ok(state
            .visible(user, query)
            .into_iter()
            .map(FileSummary::from)
            .collect())
    }

    async fn count_files(&self, user: UserId, query: &ListingQuery) -> AppResult<u64> {
        self.ensure_available()?;
        let state = self.state.lock().await;
        Ok(state.visible(user, query).len() as u64)
    }

    async fn create_file(&self, file: &CreateFile) -> AppResult<FileMeta> {
        self.ensure_available()?;
        let mut state = self.state.lock().await;

        let owner_login = state
            .users
            .get(&file.owner_id)
            .map(|u| u.login.clone())
            .ok_or_else(|| AppError::not_found(format!("User {} does not exist", file.owner_id)))?;

        let mut grants = Vec::with_capacity(file.grant_logins.len());
        for login in &file.grant_logins {
            let grantee = state
                .user_by_login(login)
                .map(|u| u.id)
                .ok_or_else(|| AppError::not_found(format!("User '{login}' does not exist")))?;
            if !grants.contains(&grantee) {
                grants.push(grantee);
            }
        }
        grants.sort();

        state.next_file_id += 1;
        let meta = FileMeta {
            id: FileId(state.next_file_id),
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size_bytes: file.size_bytes,
            owner_id: file.owner_id,
            owner_login,
            is_public: file.is_public,
            grants,
            created_at: file.created_at,
            storage_path: file.storage_path.clone(),
        };
        state.files.insert(
            meta.id,
            FileRecord {
                meta: meta.clone(),
                json_data: file.json_data.clone(),
            },
        );
        Ok(meta)
    }

    async fn delete_file(&self, id: FileId) -> AppResult<Option<String>> {
        self.ensure_available()?;
        let mut state = self.state.lock().await;
        Ok(state.files.remove(&id).map(|record| record.meta.storage_path))
    }

    async fn find_user_id_by_login(&self, login: &str) -> AppResult<Option<UserId>> {
        self.ensure_available()?;
        Ok(self.state.lock().await.user_by_login(login).map(|u| u.id))
    }
}

#[async_trait]
impl UserSource for MemoryStore {
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        self.ensure_available()?;
        Ok(self.state.lock().await.user_by_login(login).cloned())
    }

    async fn create_user(&self, user: &CreateUser) -> AppResult<User> {
        self.ensure_available()?;
        let mut state = self.state.lock().await;
        if state.user_by_login(&user.login).is_some() {
            return Err(AppError::conflict(format!(
                "Login '{}' is already taken",
                user.login
            )));
        }
        state.next_user_id += 1;
        let created = User {
            id: UserId(state.next_user_id),
            login: user.login.clone(),
            password_hash: user.password_hash.clone(),
            registered_at: Utc::now(),
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use dochub_core::ErrorKind;

    async fn user(store: &MemoryStore, login: &str) -> UserId {
        store
            .create_user(&CreateUser {
                login: login.to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .expect("create user")
            .id
    }

    fn new_file(owner: UserId, name: &str, grants: &[&str], offset_secs: i64) -> CreateFile {
        let created_at = DateTime::from_timestamp(1_700_000_000 + offset_secs, 0).expect("valid timestamp");
        CreateFile {
            name: name.to_string(),
            mime_type: "text/plain".to_string(),
            size_bytes: 3,
            owner_id: owner,
            is_public: false,
            grant_logins: grants.iter().map(|s| s.to_string()).collect(),
            created_at,
            storage_path: format!("{owner}/{}_{name}", created_at.timestamp()),
            json_data: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_login_conflicts() {
        let store = MemoryStore::new();
        user(&store, "alice_owner").await;
        let err = store
            .create_user(&CreateUser {
                login: "alice_owner".to_string(),
                password_hash: "other".to_string(),
            })
            .await
            .expect_err("duplicate login");
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_unknown_grantee_writes_nothing() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice_owner").await;
        let err = store
            .create_file(&new_file(alice, "a.txt", &["nobody_here"], 0))
            .await
            .expect_err("unknown grantee");
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(store.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_grants_visible_only_with_login_filter() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice_owner").await;
        let bob = user(&store, "bob_grantee").await;
        store
            .create_file(&new_file(alice, "a.txt", &["bob_grantee"], 0))
            .await
            .expect("create");

        let owned_only = store.list_files(bob, &ListingQuery::default()).await.expect("list");
        assert!(owned_only.is_empty());

        let with_grants = ListingQuery {
            login: Some("alice_owner".to_string()),
            ..ListingQuery::default()
        };
        let listed = store.list_files(bob, &with_grants).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].grant, vec![bob]);
    }

    #[tokio::test]
    async fn test_ordering_and_limit() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice_owner").await;
        for (name, offset) in [("b.txt", 0), ("a.txt", 0), ("a.txt", 60)] {
            store
                .create_file(&new_file(alice, name, &[], offset))
                .await
                .expect("create");
        }

        let listed = store.list_files(alice, &ListingQuery::default()).await.expect("list");
        let names: Vec<_> = listed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "a.txt", "b.txt"]);
        assert!(listed[0].created > listed[1].created);

        let limited = ListingQuery {
            limit: Some(2),
            ..ListingQuery::default()
        };
        assert_eq!(store.count_files(alice, &limited).await.expect("count"), 2);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let err = store.find_file(FileId(1)).await.expect_err("unavailable");
        assert_eq!(err.kind, ErrorKind::SourceUnavailable);
    }
}
