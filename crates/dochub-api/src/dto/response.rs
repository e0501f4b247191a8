//! Response DTOs.
//!
//! Account endpoints wrap their payload in `{"response": ...}`, document
//! endpoints in `{"data": ...}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use dochub_entity::file::FileSummary;

/// `{"response": ...}` wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    pub response: T,
}

impl<T> ResponseEnvelope<T> {
    pub fn new(response: T) -> Self {
        Self { response }
    }
}

/// `{"data": ...}` wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Registration result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredResponse {
    pub login: String,
}

/// Login result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Upload result: the attached payload and the stored file name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub json: Option<Value>,
    pub file: String,
}

/// Listing result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsResponse {
    pub docs: Vec<FileSummary>,
}

/// A document with a JSON payload; content is base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub json: Value,
    pub file: String,
    pub content: String,
}

/// Health check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` when every dependency answered, `degraded` otherwise.
    pub status: String,
    pub version: String,
    pub cache: String,
    pub storage: String,
}
