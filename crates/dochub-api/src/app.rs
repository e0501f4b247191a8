//! Application builder and server loop.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use dochub_core::error::AppError;
use dochub_core::result::AppResult;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serves `app` until `shutdown` fires, then drains in-flight requests.
pub async fn serve(listener: TcpListener, app: Router, shutdown: CancellationToken) -> AppResult<()> {
    let addr = listener
        .local_addr()
        .map_err(|e| AppError::internal(format!("Listener has no local address: {e}")))?;
    tracing::info!(%addr, "DocHub server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))
}
