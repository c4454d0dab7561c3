//! Notification handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use encore_core::types::id::NotificationId;
use encore_entity::notification::NotificationWithActor;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Page size of the notification list.
const LIST_LIMIT: usize = 50;

/// Dismissal response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DismissResponse {
    /// Always true on success.
    pub success: bool,
    /// Notifications that changed state.
    pub dismissed: u64,
}

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<NotificationWithActor>>, ApiError> {
    let items = state
        .notifications
        .list_for_user(auth.user_id, LIST_LIMIT)
        .await?;
    Ok(Json(items))
}

/// Result of marking one notification seen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeenResponse {
    pub success: bool,
    pub updated: bool,
}

/// POST /api/notifications/{id}/seen
pub async fn mark_seen(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<NotificationId>,
) -> Result<Json<SeenResponse>, ApiError> {
    let updated = state.notifications.mark_seen(id, auth.user_id).await?;
    Ok(Json(SeenResponse {
        success: true,
        updated,
    }))
}

/// POST /api/notifications/{id}/dismiss
///
/// Dismissing someone else's (or an unknown) notification succeeds with
/// `dismissed: 0`.
pub async fn dismiss(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<NotificationId>,
) -> Result<Json<DismissResponse>, ApiError> {
    let changed = state.notifications.dismiss(id, auth.user_id).await?;
    Ok(Json(DismissResponse {
        success: true,
        dismissed: u64::from(changed),
    }))
}

/// POST /api/notifications/dismiss-all
pub async fn dismiss_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DismissResponse>, ApiError> {
    let dismissed = state.notifications.dismiss_all(auth.user_id).await?;
    Ok(Json(DismissResponse {
        success: true,
        dismissed,
    }))
}
