//! Message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use encore_core::types::id::{MessageId, UserId};

use super::kind::MessageKind;

/// A persisted direct message between two users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Author of the message.
    pub sender_id: UserId,
    /// Recipient of the message.
    pub receiver_id: UserId,
    /// Text body (absent for pure file messages).
    pub content: Option<String>,
    /// Uploaded file location (absent for text messages).
    pub file_url: Option<String>,
    /// Type discriminator.
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Whether the recipient has read the message.
    #[sqlx(rename = "is_read")]
    pub read: bool,
    /// Authoritative ordering key.
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new message. Always stored unread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    /// Author.
    pub sender_id: UserId,
    /// Recipient.
    pub receiver_id: UserId,
    /// Text body.
    pub content: Option<String>,
    /// File reference.
    pub file_url: Option<String>,
    /// Type discriminator.
    pub kind: MessageKind,
}
