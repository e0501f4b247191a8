//! Structured listing queries.
//!
//! A [`ListingQuery`] is the full shape of a `GET /api/docs` request after
//! validation. Its canonical JSON encoding is what the listing cache key is
//! derived from, so two requests that mean the same thing share an entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use dochub_core::error::AppError;
use dochub_core::result::AppResult;

/// Columns a listing may be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterColumn {
    FileName,
    MimeType,
    CreatedAt,
}

impl FilterColumn {
    /// The column name in the `files` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileName => "file_name",
            Self::MimeType => "mime_type",
            Self::CreatedAt => "created_at",
        }
    }

    /// Parse a `key` query parameter.
    pub fn parse(key: &str) -> AppResult<Self> {
        match key {
            "file_name" => Ok(Self::FileName),
            "mime_type" => Ok(Self::MimeType),
            "created_at" => Ok(Self::CreatedAt),
            other => Err(AppError::validation(format!("Invalid filter key: {other}"))),
        }
    }
}

/// Value a filter column is compared against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    Text(String),
    /// Matches every file uploaded on this calendar day (UTC).
    Date(NaiveDate),
}

/// An equality filter on one allow-listed column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingFilter {
    pub column: FilterColumn,
    pub value: FilterValue,
}

/// A validated listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingQuery {
    /// When present, files granted to the caller are listed alongside owned ones.
    pub login: Option<String>,
    pub filter: Option<ListingFilter>,
    /// Maximum number of items; `None` means unbounded.
    pub limit: Option<u32>,
}

impl ListingQuery {
    /// Build a query from raw request parameters.
    ///
    /// Empty strings count as absent. A filter applies only when both `key`
    /// and `value` are given. Non-positive limits mean "no limit".
    pub fn from_params(
        login: Option<&str>,
        key: Option<&str>,
        value: Option<&str>,
        limit: Option<i64>,
    ) -> AppResult<Self> {
        fn non_empty(s: Option<&str>) -> Option<&str> {
            s.map(str::trim).filter(|s| !s.is_empty())
        }

        let filter = match (non_empty(key), non_empty(value)) {
            (Some(key), Some(value)) => {
                let column = FilterColumn::parse(key)?;
                let value = match column {
                    FilterColumn::CreatedAt => FilterValue::Date(parse_date(value)?),
                    _ => FilterValue::Text(value.to_string()),
                };
                Some(ListingFilter { column, value })
            }
            _ => None,
        };

        let limit = match limit {
            Some(n) if n > 0 => Some(u32::try_from(n).unwrap_or(u32::MAX)),
            _ => None,
        };

        Ok(Self {
            login: non_empty(login).map(str::to_string),
            filter,
            limit,
        })
    }

    /// Whether files granted to the caller are included.
    pub fn includes_grants(&self) -> bool {
        self.login.is_some()
    }
}

fn parse_date(value: &str) -> AppResult<NaiveDate> {
    // Accept both a bare date and the listing `created` format.
    let date_part = value.split_whitespace().next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid created_at value: {value}")))
}
