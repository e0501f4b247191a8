//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use dochub_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// An [`AppError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for an error kind.
    ///
    /// A denied read answers exactly like a missing file.
    pub fn status(kind: ErrorKind) -> StatusCode {
        match kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::TokenInvalid
            | ErrorKind::TokenExpired
            | ErrorKind::TokenRevoked
            | ErrorKind::AlreadyExpired
            | ErrorKind::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound | ErrorKind::AccessDenied => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::ServiceUnavailable
            | ErrorKind::CacheUnavailable
            | ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::SourceUnavailable
            | ErrorKind::Storage
            | ErrorKind::Serialization
            | ErrorKind::Configuration
            | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = Self::status(err.kind);

        let code = if err.kind == ErrorKind::AccessDenied {
            ErrorKind::NotFound.to_string()
        } else {
            err.kind.to_string()
        };

        if status.is_server_error() {
            tracing::error!(kind = %err.kind, error = %err, "Request failed");
        } else {
            tracing::debug!(kind = %err.kind, error = %err, "Request rejected");
        }

        let body = ApiErrorResponse {
            error: code,
            message: err.message,
        };

        (status, Json(body)).into_response()
    }
}
