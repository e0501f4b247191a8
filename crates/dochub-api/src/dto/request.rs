//! Request DTOs.

use serde::Deserialize;

use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_entity::listing::ListingQuery;

/// `POST /api/register` body.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Admin token that authorizes registration.
    pub token: String,
    /// Desired login.
    pub login: String,
    /// Plaintext password.
    pub pswd: String,
}

/// `POST /api/auth` body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub pswd: String,
}

/// Query string of `GET`/`HEAD /api/docs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingParams {
    pub login: Option<String>,
    pub key: Option<String>,
    pub value: Option<String>,
    pub limit: Option<String>,
}

impl ListingParams {
    /// Validates the raw parameters into a listing query.
    pub fn into_query(self) -> AppResult<ListingQuery> {
        let limit = match self.limit.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| AppError::validation(format!("Invalid limit '{raw}'")))?,
            ),
        };
        ListingQuery::from_params(
            self.login.as_deref(),
            self.key.as_deref(),
            self.value.as_deref(),
            limit,
        )
    }
}
