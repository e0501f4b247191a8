//! Document service: uploads, listings, reads, and deletes over the
//! source of truth, blob storage, and the cache layer.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, info, warn};

use dochub_auth::acl::AccessGate;
use dochub_cache::CacheLayer;
use dochub_core::clock::Clock;
use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::traits::storage::StorageProvider;
use dochub_core::types::FileId;
use dochub_database::source::FileSource;
use dochub_entity::file::{CreateFile, FileMeta, FileRecord, FileSummary, UploadMeta};
use dochub_entity::listing::ListingQuery;
use dochub_storage::blob_path;

use crate::context::RequestContext;

/// A readable document: metadata, content, and the optional JSON payload.
#[derive(Debug, Clone)]
pub struct FileDocument {
    /// File metadata.
    pub meta: FileMeta,
    /// File content bytes.
    pub content: Bytes,
    /// JSON payload attached at upload, if any.
    pub json: Option<Value>,
}

/// Orchestrates document flows for the HTTP handlers.
///
/// The relational source is authoritative. Reads go through the cache
/// layer and fill it on a miss; writes commit to the source first and
/// invalidate afterwards.
#[derive(Clone)]
pub struct FileService {
    /// Source of truth for file rows and grants.
    source: Arc<dyn FileSource>,
    /// Blob storage for file content.
    storage: Arc<dyn StorageProvider>,
    /// Read-through cache.
    cache: CacheLayer,
    /// Access decision, applied on every read.
    gate: AccessGate,
    /// Timestamps new uploads.
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService")
            .field("storage", &self.storage.provider_type())
            .finish()
    }
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        source: Arc<dyn FileSource>,
        storage: Arc<dyn StorageProvider>,
        cache: CacheLayer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            storage,
            cache,
            gate: AccessGate::new(),
            clock,
        }
    }

    /// Stores a new document owned by the caller.
    ///
    /// The row and its grants are inserted in one transaction; an unknown
    /// grantee login fails the whole upload with `NotFound`. If the blob
    /// cannot be written the row is removed again.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        meta: UploadMeta,
        content: Bytes,
        json: Option<Value>,
    ) -> AppResult<FileMeta> {
        ctx.ensure_active()?;

        let created_at = self.clock.now();
        let storage_path = blob_path(ctx.user_id, &meta.name, created_at);
        let size_bytes = i64::try_from(content.len())
            .map_err(|_| AppError::validation("File is too large"))?;

        let record = CreateFile {
            grant_logins: meta.effective_grants(),
            name: meta.name,
            mime_type: meta.mime,
            size_bytes,
            owner_id: ctx.user_id,
            is_public: meta.public,
            created_at,
            storage_path: storage_path.clone(),
            json_data: json,
        };

        let created = self.source.create_file(&record).await?;

        if let Err(e) = self.storage.save(&storage_path, content).await {
            warn!(file_id = %created.id, path = %storage_path, error = %e, "Blob write failed, removing file row");
            if let Err(cleanup) = self.source.delete_file(created.id).await {
                warn!(file_id = %created.id, error = %cleanup, "Failed to remove orphaned file row");
            }
            // Reads between commit and removal may have cached the row.
            self.cache.invalidate_after_delete(created.id).await;
            return Err(e);
        }

        self.cache.invalidate_after_create().await;

        info!(
            user_id = %ctx.user_id,
            file_id = %created.id,
            name = %created.name,
            size = created.size_bytes,
            grants = created.grants.len(),
            "Upload completed"
        );

        Ok(created)
    }

    /// Lists the caller's documents.
    ///
    /// With a `login` filter the listing covers owned and granted files,
    /// without one only owned files.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: &ListingQuery,
    ) -> AppResult<Vec<FileSummary>> {
        ctx.ensure_active()?;

        if let Some(docs) = self.cache.get_listing(ctx.user_id, query).await {
            return Ok(docs);
        }

        let docs = self.source.list_files(ctx.user_id, query).await?;
        self.cache
            .put_listing(ctx.user_id, query, &docs, &ctx.cancel)
            .await;
        Ok(docs)
    }

    /// Number of documents [`list`](Self::list) would return.
    pub async fn count(&self, ctx: &RequestContext, query: &ListingQuery) -> AppResult<u64> {
        ctx.ensure_active()?;

        if let Some(docs) = self.cache.get_listing(ctx.user_id, query).await {
            return Ok(docs.len() as u64);
        }
        self.source.count_files(ctx.user_id, query).await
    }

    /// Metadata of a readable document, without touching its content.
    pub async fn head(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<FileMeta> {
        ctx.ensure_active()?;

        let meta = match self.cache.get_meta(file_id).await {
            Some(meta) => meta,
            None => self.load_record(file_id).await?.meta,
        };
        self.gate.check(&meta, ctx.user_id)?;
        Ok(meta)
    }

    /// Reads a document the caller may access.
    ///
    /// The access check runs on every read, cached or not. Any part missing
    /// from the cache is loaded and the whole file view refilled, unless the
    /// request was cancelled in the meantime.
    pub async fn get(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<FileDocument> {
        ctx.ensure_active()?;

        // Outer `None` means the payload is not known yet.
        let (meta, mut payload, meta_hit) = match self.cache.get_meta(file_id).await {
            Some(meta) => (meta, None, true),
            None => {
                let record = self.load_record(file_id).await?;
                (record.meta, Some(record.json_data), false)
            }
        };

        self.gate.check(&meta, ctx.user_id)?;

        let mut json_hit = false;
        if payload.is_none() {
            payload = match self.cache.get_json(file_id).await {
                Some(Value::Null) => {
                    json_hit = true;
                    Some(None)
                }
                Some(value) => {
                    json_hit = true;
                    Some(Some(value))
                }
                None => Some(self.load_record(file_id).await?.json_data),
            };
        }
        let json = payload.flatten();

        let (content, content_hit) = match self.cache.get_content(file_id).await {
            Some(content) => (content, true),
            None => (self.storage.read_bytes(&meta.storage_path).await?, false),
        };

        if meta_hit && json_hit && content_hit {
            debug!(file_id = %file_id, "Served document from cache");
        } else {
            self.cache
                .put_file(&meta, &content, json.as_ref(), &ctx.cancel)
                .await;
        }

        Ok(FileDocument {
            meta,
            content,
            json,
        })
    }

    /// Deletes a document the caller owns or was granted.
    ///
    /// Cache entries are invalidated only after the row is gone. A blob
    /// that cannot be removed is logged and left behind.
    pub async fn delete(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<()> {
        ctx.ensure_active()?;

        let record = self.load_record(file_id).await?;
        self.gate.check_manage(&record.meta, ctx.user_id)?;

        let storage_path = self
            .source
            .delete_file(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        if let Err(e) = self.storage.delete(&storage_path).await {
            warn!(file_id = %file_id, path = %storage_path, error = %e, "Failed to delete blob");
        }

        self.cache.invalidate_after_delete(file_id).await;

        info!(user_id = %ctx.user_id, file_id = %file_id, "File deleted");
        Ok(())
    }

    async fn load_record(&self, file_id: FileId) -> AppResult<FileRecord> {
        self.source
            .find_file(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }
}
