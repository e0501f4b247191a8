//! Validated upload metadata.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use dochub_core::error::AppError;
use dochub_core::result::AppResult;

/// The `meta` part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UploadMeta {
    /// File name as it should appear in listings.
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
    /// Must be `true`; uploads always carry a file part.
    #[validate(custom(function = "require_file_flag"))]
    pub file: bool,
    /// MIME type of the file part.
    #[validate(length(min = 1, max = 255, message = "mime is required"))]
    pub mime: String,
    /// Whether any authenticated user may read the file.
    pub public: bool,
    /// Logins of users granted read access. Ignored for public files.
    #[serde(default)]
    pub grant: Vec<String>,
}

impl UploadMeta {
    /// Parse and validate the raw `meta` JSON.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let meta: Self = serde_json::from_str(raw)
            .map_err(|e| AppError::validation(format!("Invalid 'meta' JSON: {e}")))?;
        meta.validate()
            .map_err(|e| AppError::validation(format!("Invalid upload metadata: {e}")))?;
        if meta.name.contains('/') || meta.name.contains('\\') || meta.name.contains("..") {
            return Err(AppError::validation("File name must not contain path separators"));
        }
        Ok(meta)
    }

    /// Grantee logins that take effect for this upload.
    pub fn effective_grants(&self) -> Vec<String> {
        if self.public {
            return Vec::new();
        }
        let mut grants = self.grant.clone();
        grants.sort();
        grants.dedup();
        grants
    }
}

fn require_file_flag(flag: &bool) -> Result<(), ValidationError> {
    if *flag {
        Ok(())
    } else {
        Err(ValidationError::new("file_flag").with_message("'file' flag must be true".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dochub_core::ErrorKind;

    #[test]
    fn test_parse_valid_meta() {
        let meta = UploadMeta::parse(
            r#"{"name":"a.txt","file":true,"mime":"text/plain","public":false,"grant":["bob_grantee","bob_grantee"]}"#,
        )
        .expect("valid meta");
        assert_eq!(meta.name, "a.txt");
        assert_eq!(meta.effective_grants(), vec!["bob_grantee".to_string()]);
    }

    #[test]
    fn test_file_flag_must_be_true() {
        let err = UploadMeta::parse(r#"{"name":"a.txt","file":false,"mime":"text/plain","public":true}"#)
            .expect_err("file=false must be rejected");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_missing_mime_rejected() {
        let err = UploadMeta::parse(r#"{"name":"a.txt","file":true,"mime":"","public":true}"#)
            .expect_err("empty mime must be rejected");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_path_like_name_rejected() {
        let err = UploadMeta::parse(r#"{"name":"../etc/passwd","file":true,"mime":"text/plain","public":true}"#)
            .expect_err("path traversal must be rejected");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_public_file_ignores_grants() {
        let meta = UploadMeta::parse(
            r#"{"name":"a.txt","file":true,"mime":"text/plain","public":true,"grant":["bob_grantee"]}"#,
        )
        .expect("valid meta");
        assert!(meta.effective_grants().is_empty());
    }
}
