//! Presence polling handler.

use axum::Json;
use axum::extract::State;

use encore_core::types::id::UserId;

use crate::state::AppState;

/// GET /api/presence/online
pub async fn online_users(State(state): State<AppState>) -> Json<Vec<UserId>> {
    Json(state.realtime.online_users().into_inner())
}
