//! File repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;

use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{FileId, UserId};
use dochub_entity::file::{CreateFile, FileMeta, FileRecord, FileSummary};
use dochub_entity::listing::{FilterColumn, FilterValue, ListingQuery};

use super::source_error;
use crate::source::FileSource;

const FILE_COLUMNS: &str = "f.id, f.file_name, f.mime_type, f.size, f.creator, u.login AS owner_login, \
     f.is_public, f.created_at, f.file_path, f.json_data, \
     COALESCE((SELECT array_agg(g.user_id ORDER BY g.user_id) FROM grants g WHERE g.file_id = f.id), \
     '{}'::BIGINT[]) AS grants";

/// Raw `files` row joined with its owner's login and aggregated grants.
#[derive(Debug, FromRow)]
struct FileRow {
    id: FileId,
    file_name: String,
    mime_type: String,
    size: i64,
    creator: UserId,
    owner_login: String,
    is_public: bool,
    created_at: DateTime<Utc>,
    file_path: String,
    json_data: Option<serde_json::Value>,
    grants: Vec<i64>,
}

impl From<FileRow> for FileRecord {
    fn from(row: FileRow) -> Self {
        Self {
            meta: FileMeta {
                id: row.id,
                name: row.file_name,
                mime_type: row.mime_type,
                size_bytes: row.size,
                owner_id: row.creator,
                owner_login: row.owner_login,
                is_public: row.is_public,
                grants: row.grants.into_iter().map(UserId).collect(),
                created_at: row.created_at,
                storage_path: row.file_path,
            },
            json_data: row.json_data,
        }
    }
}

/// Repository for file and grant persistence.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append the visibility and filter conditions of a listing query.
fn push_listing_conditions(builder: &mut QueryBuilder<'_, Postgres>, user: UserId, query: &ListingQuery) {
    builder.push(" WHERE (f.creator = ");
    builder.push_bind(user);
    if query.includes_grants() {
        builder.push(" OR EXISTS (SELECT 1 FROM grants g WHERE g.file_id = f.id AND g.user_id = ");
        builder.push_bind(user);
        builder.push(")");
    }
    builder.push(")");

    if let Some(filter) = &query.filter {
        match (&filter.column, &filter.value) {
            (FilterColumn::CreatedAt, FilterValue::Date(date)) => {
                builder.push(" AND (f.created_at AT TIME ZONE 'UTC')::date = ");
                builder.push_bind(*date);
            }
            (column, FilterValue::Text(text)) => {
                builder.push(format!(" AND f.{} = ", column.as_str()));
                builder.push_bind(text.clone());
            }
            (column, FilterValue::Date(date)) => {
                builder.push(format!(" AND f.{} = ", column.as_str()));
                builder.push_bind(date.to_string());
            }
        }
    }
}

#[async_trait]
impl FileSource for FileRepository {
    async fn find_file(&self, id: FileId) -> AppResult<Option<FileRecord>> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM files f JOIN users u ON u.id = f.creator WHERE f.id = $1"
        );
        let row = sqlx::query_as::<_, FileRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(source_error("Failed to find file"))?;
        Ok(row.map(FileRecord::from))
    }

    async fn list_files(&self, user: UserId, query: &ListingQuery) -> AppResult<Vec<FileSummary>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {FILE_COLUMNS} FROM files f JOIN users u ON u.id = f.creator"
        ));
        push_listing_conditions(&mut builder, user, query);
        builder.push(" ORDER BY f.file_name ASC, f.created_at DESC");
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(i64::from(limit));
        }

        let rows = builder
            .build_query_as::<FileRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(source_error("Failed to list files"))?;

        debug!(user_id = %user, count = rows.len(), "Listed files from database");
        Ok(rows
            .into_iter()
            .map(|row| FileSummary::from(&FileRecord::from(row).meta))
            .collect())
    }

    async fn count_files(&self, user: UserId, query: &ListingQuery) -> AppResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM files f");
        push_listing_conditions(&mut builder, user, query);

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(source_error("Failed to count files"))?;

        let total = u64::try_from(total).unwrap_or(0);
        Ok(match query.limit {
            Some(limit) => total.min(u64::from(limit)),
            None => total,
        })
    }

    async fn create_file(&self, file: &CreateFile) -> AppResult<FileMeta> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(source_error("Failed to start transaction"))?;

        let id: FileId = sqlx::query_scalar(
            "INSERT INTO files (file_name, size, created_at, json_data, creator, mime_type, is_public, file_path) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(&file.name)
        .bind(file.size_bytes)
        .bind(file.created_at)
        .bind(&file.json_data)
        .bind(file.owner_id)
        .bind(&file.mime_type)
        .bind(file.is_public)
        .bind(&file.storage_path)
        .fetch_one(&mut *tx)
        .await
        .map_err(source_error("Failed to insert file"))?;

        let mut grants = Vec::with_capacity(file.grant_logins.len());
        for login in &file.grant_logins {
            let grantee: Option<UserId> = sqlx::query_scalar("SELECT id FROM users WHERE login = $1")
                .bind(login)
                .fetch_optional(&mut *tx)
                .await
                .map_err(source_error("Failed to resolve grantee"))?;
            // Dropping `tx` on this early return rolls the insert back.
            let grantee =
                grantee.ok_or_else(|| AppError::not_found(format!("User '{login}' does not exist")))?;

            sqlx::query(
                "INSERT INTO grants (file_id, user_id) VALUES ($1, $2) ON CONFLICT (file_id, user_id) DO NOTHING",
            )
            .bind(id)
            .bind(grantee)
            .execute(&mut *tx)
            .await
            .map_err(source_error("Failed to insert grant"))?;

            if !grants.contains(&grantee) {
                grants.push(grantee);
            }
        }

        let owner_login: String = sqlx::query_scalar("SELECT login FROM users WHERE id = $1")
            .bind(file.owner_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(source_error("Failed to load owner"))?
            .ok_or_else(|| AppError::not_found(format!("User {} does not exist", file.owner_id)))?;

        tx.commit()
            .await
            .map_err(source_error("Failed to commit file insert"))?;

        grants.sort();
        Ok(FileMeta {
            id,
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size_bytes: file.size_bytes,
            owner_id: file.owner_id,
            owner_login,
            is_public: file.is_public,
            grants,
            created_at: file.created_at,
            storage_path: file.storage_path.clone(),
        })
    }

    async fn delete_file(&self, id: FileId) -> AppResult<Option<String>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(source_error("Failed to start transaction"))?;

        let path: Option<String> =
            sqlx::query_scalar("DELETE FROM files WHERE id = $1 RETURNING file_path")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(source_error("Failed to delete file"))?;

        tx.commit()
            .await
            .map_err(source_error("Failed to commit file delete"))?;
        Ok(path)
    }

    async fn find_user_id_by_login(&self, login: &str) -> AppResult<Option<UserId>> {
        sqlx::query_scalar("SELECT id FROM users WHERE login = $1")
            .bind(login)
            .fetch_optional(&self.pool)
            .await
            .map_err(source_error("Failed to find user by login"))
    }
}
