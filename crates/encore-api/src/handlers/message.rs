//! Direct message handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use encore_core::error::AppError;
use encore_core::types::id::UserId;
use encore_entity::message::{Message, MessageKind};
use encore_realtime::delivery::SendOutcome;
use encore_realtime::message::types::SendMessagePayload;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Body of `POST /api/messages/{user_id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Text body.
    #[serde(default)]
    pub content: Option<String>,
    /// Previously uploaded file.
    #[serde(default)]
    pub file_url: Option<String>,
    /// Type discriminator.
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
}

/// Read-receipt response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadResponse {
    /// Always true on success.
    pub success: bool,
    /// Messages flipped to read.
    pub updated: u64,
}

/// GET /api/messages/{user_id}
pub async fn conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(other): Path<UserId>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state
        .realtime
        .messages
        .conversation(auth.user_id, other)
        .await?;
    Ok(Json(messages))
}

/// POST /api/messages/{user_id}
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(to): Path<UserId>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let payload = SendMessagePayload {
        to: Some(to),
        content: req.content,
        file_url: req.file_url,
        kind: req.kind,
    };

    match state
        .realtime
        .messages
        .send_message(auth.user_id, None, payload)
        .await?
    {
        SendOutcome::Delivered { message, .. } => Ok((StatusCode::CREATED, Json(message))),
        SendOutcome::Dropped => {
            Err(AppError::validation("Message content or file required").into())
        }
    }
}

/// PATCH /api/messages/{user_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(sender): Path<UserId>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let updated = state
        .realtime
        .messages
        .read_messages(auth.user_id, sender)
        .await?;
    Ok(Json(MarkReadResponse {
        success: true,
        updated,
    }))
}
