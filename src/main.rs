//! Encore Server: real-time presence, chat delivery, and notification fan-out
//!
//! Main entry point that wires all crates together and starts the server.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use tracing_subscriber::{EnvFilter, fmt};

use encore_api::AppState;
use encore_auth::jwt::JwtVerifier;
use encore_auth::verifier::CredentialVerifier;
use encore_core::config::{AppConfig, DatabaseBackend};
use encore_core::error::AppError;
use encore_database::DatabasePool;
use encore_database::repositories::{MessageRepository, NotificationRepository};
use encore_realtime::RealtimeEngine;
use encore_realtime::store::{
    MemoryMessageStore, MemoryNotificationStore, MessageStore, NotificationStore,
};

/// Environment used when `ENCORE_ENV` is unset. It has no overlay file, so
/// only `config/default.toml` and `ENCORE__*` variables apply.
const DEFAULT_ENV: &str = "production";

#[tokio::main]
async fn main() {
    let env = std::env::var("ENCORE_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(
        environment = %env,
        backend = ?config.database.backend,
        "Configuration loaded"
    );

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
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
    tracing::info!("Starting Encore v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.jwt_secret.is_empty() {
        return Err(AppError::configuration("auth.jwt_secret must be set"));
    }

    // ── Step 1: Storage backend ──────────────────────────────────
    let (message_store, notification_store, db_pool): (
        Arc<dyn MessageStore>,
        Arc<dyn NotificationStore>,
        Option<DatabasePool>,
    ) = match config.database.backend {
        DatabaseBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db = DatabasePool::connect(&config.database).await?;
            db.migrate().await?;
            tracing::info!("Database migrations complete");
            (
                Arc::new(MessageRepository::new(db.pool())) as Arc<dyn MessageStore>,
                Arc::new(NotificationRepository::new(db.pool())) as Arc<dyn NotificationStore>,
                Some(db),
            )
        }
        DatabaseBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            (
                Arc::new(MemoryMessageStore::new()) as Arc<dyn MessageStore>,
                Arc::new(MemoryNotificationStore::new()) as Arc<dyn NotificationStore>,
                None,
            )
        }
    };

    // ── Step 2: Credential verifier ──────────────────────────────
    let verifier: Arc<dyn CredentialVerifier> = Arc::new(JwtVerifier::new(&config.auth));

    // ── Step 3: Realtime engine ──────────────────────────────────
    let realtime = Arc::new(RealtimeEngine::start(
        config.realtime.clone(),
        Arc::clone(&verifier),
        message_store,
        Arc::clone(&notification_store),
    ));

    // ── Step 4: HTTP server ──────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let app_state = AppState::new(config, Arc::clone(&realtime), verifier, notification_store)
        .with_database(db_pool.clone());
    let app = encore_api::build_app(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Encore server listening on {}", addr);

    // ── Step 5: Graceful shutdown ────────────────────────────────
    let engine = Arc::clone(&realtime);
    let (draining_tx, draining_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        // Upgraded sockets keep the server alive until they are closed.
        engine.shutdown().await;
        let _ = draining_tx.send(());
    });
    let server = server.into_future();
    tokio::pin!(server);

    let grace_expired = async {
        if draining_rx.await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = &mut server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = grace_expired => tracing::warn!("Graceful shutdown timed out after {:?}", grace),
    }

    if let Some(db) = db_pool {
        db.close().await;
    }

    tracing::info!("Encore server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
