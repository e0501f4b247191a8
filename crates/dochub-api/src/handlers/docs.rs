//! Document upload, listing, download, and delete handlers.

use std::collections::HashMap;

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderName, StatusCode, header};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use serde_json::Value;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::types::FileId;
use dochub_entity::file::UploadMeta;

use crate::dto::request::ListingParams;
use crate::dto::response::{
    DataEnvelope, DocsResponse, DocumentResponse, ResponseEnvelope, UploadResponse,
};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::cors::DOC_COUNT_HEADER;
use crate::state::AppState;

/// POST /api/docs
///
/// Multipart parts: `meta` (JSON upload metadata), optional `json`
/// (payload stored with the file), and `file` (content).
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<DataEnvelope<UploadResponse>>, ApiError> {
    let mut meta_raw: Option<String> = None;
    let mut json_raw: Option<String> = None;
    let mut content: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "meta" => {
                meta_raw = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            "json" => {
                json_raw = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            "file" => {
                content = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let meta_raw = meta_raw.ok_or_else(|| AppError::validation("Missing 'meta' field"))?;
    let meta = UploadMeta::parse(&meta_raw)?;

    let json = match json_raw.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            serde_json::from_str::<Value>(raw)
                .map_err(|e| AppError::validation(format!("Invalid 'json' JSON: {e}")))?,
        ),
    };

    let content = content.ok_or_else(|| AppError::validation("Missing 'file' part"))?;

    let created = state
        .files
        .upload(&auth, meta, content, json.clone())
        .await?;

    Ok(Json(DataEnvelope::new(UploadResponse {
        json,
        file: created.name,
    })))
}

/// GET /api/docs?login=&key=&value=&limit=
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListingParams>,
) -> Result<Json<DataEnvelope<DocsResponse>>, ApiError> {
    let query = params.into_query()?;
    let docs = state.files.list(&auth, &query).await?;
    Ok(Json(DataEnvelope::new(DocsResponse { docs })))
}

/// HEAD /api/docs
pub async fn count(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListingParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = params.into_query()?;
    let count = state.files.count(&auth, &query).await?;
    Ok([(HeaderName::from_static(DOC_COUNT_HEADER), count.to_string())])
}

/// GET /api/docs/{id}
///
/// Raw content with the stored MIME type, or a JSON envelope with the
/// base64 content when the file carries a payload.
pub async fn get_doc(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_file_id(&raw_id)?;
    let doc = state
        .files
        .get(&auth, id)
        .await
        .map_err(|e| conceal(e, id))?;

    if let Some(json) = doc.json {
        let body = DocumentResponse {
            json,
            file: doc.meta.name,
            content: BASE64.encode(&doc.content),
        };
        return Ok(Json(DataEnvelope::new(body)).into_response());
    }

    let filename = doc.meta.name.replace('"', "_");
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, doc.meta.mime_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .header(header::CONTENT_LENGTH, doc.content.len())
        .body(Body::from(doc.content))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")).into())
}

/// HEAD /api/docs/{id}
pub async fn head_doc(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_file_id(&raw_id)?;
    let meta = state
        .files
        .head(&auth, id)
        .await
        .map_err(|e| conceal(e, id))?;

    Ok([
        (header::CONTENT_TYPE, meta.mime_type),
        (header::CONTENT_LENGTH, meta.size_bytes.to_string()),
    ])
}

/// DELETE /api/docs/{id}
pub async fn delete_doc(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<ResponseEnvelope<HashMap<String, bool>>>, ApiError> {
    let id = parse_file_id(&raw_id)?;
    state
        .files
        .delete(&auth, id)
        .await
        .map_err(|e| conceal(e, id))?;
    Ok(Json(ResponseEnvelope::new(HashMap::from([(
        id.to_string(),
        true,
    )]))))
}

fn parse_file_id(raw: &str) -> Result<FileId, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation(format!("Invalid document id '{raw}'")))
}

/// A denied file reads the same as a missing one.
fn conceal(err: AppError, id: FileId) -> AppError {
    if err.kind == ErrorKind::AccessDenied {
        AppError::not_found(format!("File {id} not found"))
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denial_is_indistinguishable_from_missing() {
        let denied = conceal(AppError::access_denied("User 3 may not access file 7"), FileId(7));
        let missing = AppError::not_found("File 7 not found");
        assert_eq!(denied.kind, missing.kind);
        assert_eq!(denied.message, missing.message);
    }

    #[test]
    fn test_file_id_parsing() {
        assert_eq!(parse_file_id("42").expect("id"), FileId(42));
        let err = parse_file_id("abc").expect_err("not a number");
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
