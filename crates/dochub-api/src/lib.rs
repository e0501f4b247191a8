//! # dochub-api
//!
//! HTTP API layer for DocHub built on Axum.
//!
//! Provides the registration, token, and document endpoints, the bearer
//! credential extractor, DTOs, and the mapping from [`AppError`] kinds to
//! HTTP status codes.
//!
//! [`AppError`]: dochub_core::error::AppError

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use error::ApiError;
pub use state::AppState;
