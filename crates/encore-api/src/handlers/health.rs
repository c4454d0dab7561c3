//! Health check handler.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use tracing::warn;

use encore_realtime::metrics::MetricsSnapshot;

use crate::state::AppState;

/// Health response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database does not answer.
    pub status: String,
    /// `connected`, `unreachable`, or `memory` when no database is configured.
    pub database: String,
    /// Crate version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
    /// Open WebSocket connections.
    pub ws_connections: usize,
    /// Users with at least one registered connection.
    pub online_users: usize,
    /// Engine counters.
    pub metrics: MetricsSnapshot,
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = database_status(&state).await;
    let status = if database == "unreachable" { "degraded" } else { "ok" };

    let realtime = &state.realtime;
    Json(HealthResponse {
        status: status.to_string(),
        database: database.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        ws_connections: realtime.connections.connection_count(),
        online_users: realtime.registry.online_count(),
        metrics: realtime.metrics.snapshot(),
    })
}

async fn database_status(state: &AppState) -> &'static str {
    let Some(db) = &state.database else {
        return "memory";
    };
    match db.health_check().await {
        Ok(true) => "connected",
        Ok(false) => "unreachable",
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            "unreachable"
        }
    }
}
