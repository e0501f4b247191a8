//! Request context carrying the authenticated caller and its cancellation signal.

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::UserId;

/// Context for the current authenticated request.
///
/// Built by the HTTP boundary from verified token claims and passed into
/// service methods so that every operation knows *who* is acting and
/// whether the caller has gone away.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The login carried in the token claims.
    pub login: String,
    /// Client address of the request origin.
    pub client_addr: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
    /// Fired when the caller abandons the request.
    pub cancel: CancellationToken,
}

impl RequestContext {
    /// Creates a new request context with a fresh cancellation token.
    pub fn new(user_id: UserId, login: impl Into<String>, client_addr: impl Into<String>) -> Self {
        Self {
            user_id,
            login: login.into(),
            client_addr: client_addr.into(),
            request_time: Utc::now(),
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token, typically with a child of the
    /// server's shutdown token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fails with `Cancelled` once the caller has gone away.
    pub fn ensure_active(&self) -> AppResult<()> {
        if self.cancel.is_cancelled() {
            return Err(AppError::cancelled("Request was cancelled"));
        }
        Ok(())
    }
}
