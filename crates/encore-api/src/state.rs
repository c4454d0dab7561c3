//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use encore_auth::verifier::CredentialVerifier;
use encore_core::config::AppConfig;
use encore_database::DatabasePool;
use encore_realtime::server::RealtimeEngine;
use encore_realtime::store::NotificationStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Real-time engine (presence, delivery, notification fan-out)
    pub realtime: Arc<RealtimeEngine>,
    /// Credential verifier for REST calls
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Notification storage for the list/dismiss endpoints
    pub notifications: Arc<dyn NotificationStore>,
    /// Postgres pool, absent on the memory backend
    pub database: Option<DatabasePool>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("realtime", &self.realtime)
            .finish()
    }
}

impl AppState {
    /// Bundles the shared dependencies.
    pub fn new(
        config: AppConfig,
        realtime: Arc<RealtimeEngine>,
        verifier: Arc<dyn CredentialVerifier>,
        notifications: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            realtime,
            verifier,
            notifications,
            database: None,
            started_at: Instant::now(),
        }
    }

    /// Attaches the database pool so health checks can reach it.
    pub fn with_database(mut self, database: Option<DatabasePool>) -> Self {
        self.database = database;
        self
    }
}
