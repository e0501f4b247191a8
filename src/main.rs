//! DocHub Server: document storage with a shared read-through cache and
//! revocable bearer tokens.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use dochub_api::{AppState, build_app};
use dochub_auth::jwt::{RevocationStore, TokenAuthority};
use dochub_cache::{CacheLayer, CacheManager};
use dochub_core::clock::{Clock, SystemClock};
use dochub_core::config::AppConfig;
use dochub_core::error::AppError;
use dochub_core::traits::storage::StorageProvider;
use dochub_database::{DatabasePool, FileRepository, UserRepository};
use dochub_service::{AuthService, FileService};
use dochub_storage::LocalStorageProvider;

#[tokio::main]
async fn main() {
    let env = std::env::var("DOCHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DocHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    dochub_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Shared cache ─────────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache...");
    let cache = CacheManager::new(&config.cache).await?;

    // ── Step 3: Blob storage ─────────────────────────────────────
    let storage: Arc<dyn StorageProvider> =
        Arc::new(LocalStorageProvider::new(&config.storage.root_path).await?);
    tracing::info!(root = %config.storage.root_path, "Blob storage ready");

    // ── Step 4: Auth and services ────────────────────────────────
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let tokens = TokenAuthority::new(
        &config.auth,
        RevocationStore::new(cache.clone()),
        Arc::clone(&clock),
    )?;

    let users = Arc::new(UserRepository::new(db.pool().clone()));
    let files_repo = Arc::new(FileRepository::new(db.pool().clone()));

    let auth = AuthService::new(users, tokens, config.auth.admin_token.clone());
    let files = FileService::new(
        files_repo,
        Arc::clone(&storage),
        CacheLayer::new(cache.clone(), &config.cache),
        clock,
    );

    // ── Step 5: HTTP server ──────────────────────────────────────
    let shutdown = CancellationToken::new();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        config: Arc::new(config),
        files,
        auth,
        cache,
        storage,
        shutdown: shutdown.clone(),
    };
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    let mut server = tokio::spawn(dochub_api::serve(listener, app, shutdown.clone()));

    let served = tokio::select! {
        result = &mut server => Some(result),
        _ = shutdown_signal() => None,
    };

    let result = match served {
        Some(result) => result,
        None => {
            tracing::info!(grace_seconds = grace.as_secs(), "Shutdown signal received, draining requests");
            shutdown.cancel();
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!("Graceful shutdown timed out, aborting open connections");
                    server.abort();
                    Ok(Ok(()))
                }
            }
        }
    };

    db.close().await;
    tracing::info!("DocHub server stopped");

    result.map_err(|e| AppError::internal(format!("Server task failed: {e}")))?
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
