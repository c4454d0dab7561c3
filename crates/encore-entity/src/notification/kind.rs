//! Notification type enumeration.

use serde::{Deserialize, Serialize};

/// The actor-triggered event a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Someone commented on the recipient's post.
    Comment,
    /// Someone liked the recipient's post.
    PostLiked,
    /// Someone started following the recipient.
    NewFollower,
    /// Someone reposted the recipient's post.
    Repost,
    /// Someone sent the recipient a direct message.
    Message,
}

impl NotificationType {
    /// Return the type as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::PostLiked => "post_liked",
            Self::NewFollower => "new_follower",
            Self::Repost => "repost",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
