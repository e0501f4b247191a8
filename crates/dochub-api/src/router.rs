//! Route definitions for the DocHub HTTP API.
//!
//! Account and document routes are mounted under `/api`; the health probe
//! sits at the root.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with all routes.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    let api_routes = Router::new().merge(auth_routes()).merge(doc_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Registration, login, logout
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/auth", post(handlers::auth::login))
        .route("/auth/{token}", delete(handlers::auth::logout))
}

/// Document upload, listing, download, delete
fn doc_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/docs",
            post(handlers::docs::upload)
                .get(handlers::docs::list)
                .head(handlers::docs::count),
        )
        .route(
            "/docs/{id}",
            get(handlers::docs::get_doc)
                .head(handlers::docs::head_doc)
                .delete(handlers::docs::delete_doc),
        )
}
