//! `AuthUser` extractor: pulls the bearer token, verifies it, and builds
//! the request context.

use axum::extract::{FromRequestParts, Query};
use axum::http::header;
use axum::http::request::Parts;
use serde::Deserialize;

use dochub_core::error::AppError;
use dochub_service::context::RequestContext;

use crate::error::ApiError;
use crate::extractors::client::ClientAddr;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Deserialize)]
struct TokenParam {
    token: Option<String>,
}

/// The bearer credential: `Authorization: Bearer <token>` or `?token=`.
fn bearer_token(parts: &Parts) -> Result<String, AppError> {
    if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| AppError::token_invalid("Invalid Authorization header"))?;
        return value
            .strip_prefix("Bearer ")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::token_invalid("Invalid Authorization header format"));
    }

    Query::<TokenParam>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(param)| param.token)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::token_invalid("Missing bearer token"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.auth.tokens().verify_claims(&token).await?;
        let ClientAddr(client_addr) = ClientAddr::from_parts(parts);

        let ctx = RequestContext::new(claims.user_id, claims.user_login, client_addr)
            .with_cancel(state.shutdown.child_token());

        Ok(AuthUser(ctx))
    }
}
