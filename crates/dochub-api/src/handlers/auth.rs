//! Registration, login, and logout handlers.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::{RegisteredResponse, ResponseEnvelope, TokenResponse};
use crate::error::ApiError;
use crate::extractors::ClientAddr;
use crate::state::AppState;

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ResponseEnvelope<RegisteredResponse>>, ApiError> {
    let user = state.auth.register(&req.token, &req.login, &req.pswd).await?;
    Ok(Json(ResponseEnvelope::new(RegisteredResponse {
        login: user.login,
    })))
}

/// POST /api/auth
pub async fn login(
    State(state): State<AppState>,
    ClientAddr(client_addr): ClientAddr,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ResponseEnvelope<TokenResponse>>, ApiError> {
    let token = state.auth.login(&req.login, &req.pswd, &client_addr).await?;
    Ok(Json(ResponseEnvelope::new(TokenResponse { token })))
}

/// DELETE /api/auth/{token}
pub async fn logout(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ResponseEnvelope<HashMap<String, bool>>>, ApiError> {
    state.auth.logout(&token).await?;
    Ok(Json(ResponseEnvelope::new(HashMap::from([(token, true)]))))
}
