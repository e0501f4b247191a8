//! Unified application error types for DocHub.
//!
//! Every crate maps its internal failures into [`AppError`] so the `?`
//! operator works across crate boundaries. The [`ErrorKind`] taxonomy is
//! what the HTTP boundary inspects to pick a status code.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// The bearer token has a bad signature, format, or claims shape.
    TokenInvalid,
    /// The bearer token is past its expiry.
    TokenExpired,
    /// The bearer token was explicitly revoked.
    TokenRevoked,
    /// A revoke was requested for a token that has already expired.
    AlreadyExpired,
    /// Login or password did not match.
    InvalidCredentials,
    /// The caller may not access the requested file.
    AccessDenied,
    /// The caller lacks an administrative credential.
    Forbidden,
    /// Input validation failed.
    Validation,
    /// A uniqueness conflict occurred.
    Conflict,
    /// The caller cancelled the operation or its deadline passed.
    Cancelled,
    /// The shared cache store could not be reached. Never fatal to a request.
    CacheUnavailable,
    /// The relational source of truth failed.
    SourceUnavailable,
    /// A blob storage I/O error occurred.
    Storage,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A configuration error occurred.
    Configuration,
    /// A dependency required for a correct answer is unavailable.
    ServiceUnavailable,
    /// An internal server error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether this kind means the caller failed authentication.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::TokenInvalid | Self::TokenExpired | Self::TokenRevoked | Self::InvalidCredentials
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::NotFound => "NOT_FOUND",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::AlreadyExpired => "ALREADY_EXPIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::Forbidden => "FORBIDDEN",
            Self::Validation => "VALIDATION",
            Self::Conflict => "CONFLICT",
            Self::Cancelled => "CANCELLED",
            Self::CacheUnavailable => "CACHE_UNAVAILABLE",
            Self::SourceUnavailable => "SOURCE_UNAVAILABLE",
            Self::Storage => "STORAGE",
            Self::Serialization => "SERIALIZATION",
            Self::Configuration => "CONFIGURATION",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::Internal => "INTERNAL",
        };
        f.write_str(code)
    }
}

/// The unified application error used throughout DocHub.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn token_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenInvalid, message)
    }

    pub fn token_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenExpired, message)
    }

    pub fn token_revoked(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenRevoked, message)
    }

    pub fn already_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExpired, message)
    }

    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, message)
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessDenied, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    pub fn cache_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CacheUnavailable, message)
    }

    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SourceUnavailable, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
