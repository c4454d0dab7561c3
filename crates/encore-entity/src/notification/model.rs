//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use encore_core::types::id::{NotificationId, UserId};

use super::kind::NotificationType;
use crate::user::ActorSummary;

/// A durable notification record for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient user.
    pub user_id: UserId,
    /// The user whose action triggered the notification.
    pub from_user_id: UserId,
    /// What happened.
    #[serde(rename = "type")]
    pub kind: NotificationType,
    /// Post involved, if any.
    pub post_id: Option<i64>,
    /// Comment involved, if any.
    pub comment_id: Option<i64>,
    /// Snapshot of the triggering content (comment text, message preview).
    pub content: Option<String>,
    /// Whether the recipient has seen it.
    pub seen: bool,
    /// Whether the recipient dismissed it. Dismissed rows are never listed again.
    pub dismissed: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new notification. Stored unseen and undismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// Recipient.
    pub user_id: UserId,
    /// Actor.
    pub from_user_id: UserId,
    /// Event type.
    pub kind: NotificationType,
    /// Post reference.
    pub post_id: Option<i64>,
    /// Comment reference.
    pub comment_id: Option<i64>,
    /// Content snapshot.
    pub content: Option<String>,
}

impl NewNotification {
    /// True when the actor would be notifying themselves.
    pub fn is_self_notification(&self) -> bool {
        self.user_id == self.from_user_id
    }
}

/// A notification joined with the actor's display attributes.
///
/// This is the shape of both the live `notification:new` payload and each
/// element of the REST notification list, so clients render either without
/// a follow-up fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationWithActor {
    /// The notification row.
    #[serde(flatten)]
    pub notification: Notification,
    /// Display name of the actor.
    pub from_username: String,
    /// Avatar of the actor, if any.
    pub from_avatar: Option<String>,
    /// Full actor snapshot.
    pub actor: ActorSummary,
}

impl NotificationWithActor {
    /// Joins a notification with its actor, deriving the flat display fields.
    pub fn new(notification: Notification, actor: ActorSummary) -> Self {
        Self {
            from_username: actor.display_name().to_string(),
            from_avatar: actor.avatar().map(str::to_string),
            notification,
            actor,
        }
    }
}
