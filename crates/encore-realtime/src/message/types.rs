//! WebSocket event types (inbound from client, outbound to client).
//!
//! Every frame is a JSON object `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};

use encore_core::types::id::UserId;
use encore_entity::message::{Message, MessageKind};
use encore_entity::notification::NotificationWithActor;

/// Events sent FROM client TO server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum InboundEvent {
    /// Opt this connection into presence. The optional id must match the
    /// authenticated user.
    #[serde(rename = "register")]
    Register(Option<UserId>),
    /// Send a direct message.
    #[serde(rename = "send_message")]
    SendMessage(SendMessagePayload),
    /// The user started typing to `to`.
    #[serde(rename = "typing")]
    Typing(TypingPayload),
    /// The user stopped typing to `to`.
    #[serde(rename = "stop_typing")]
    StopTyping(TypingPayload),
    /// The user read everything `from` sent them.
    #[serde(rename = "read_messages")]
    ReadMessages(ReadMessagesPayload),
}

impl InboundEvent {
    /// Wire name of the event, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Register(_) => "register",
            Self::SendMessage(_) => "send_message",
            Self::Typing(_) => "typing",
            Self::StopTyping(_) => "stop_typing",
            Self::ReadMessages(_) => "read_messages",
        }
    }
}

/// Payload of `send_message`.
///
/// The sender is never taken from the payload; it is the connection's
/// authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    /// Recipient.
    #[serde(default)]
    pub to: Option<UserId>,
    /// Text body.
    #[serde(default)]
    pub content: Option<String>,
    /// Previously uploaded file.
    #[serde(default)]
    pub file_url: Option<String>,
    /// Type discriminator, `text` when omitted.
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
}

/// Payload of `typing` / `stop_typing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingPayload {
    /// The peer being typed to.
    pub to: UserId,
}

/// Payload of `read_messages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadMessagesPayload {
    /// The peer whose messages were read.
    pub from: UserId,
}

/// Events sent FROM server TO client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum OutboundEvent {
    /// Full set of online users.
    #[serde(rename = "presence:snapshot")]
    PresenceSnapshot(Vec<UserId>),
    /// One user crossed the online/offline boundary.
    #[serde(rename = "presence:update")]
    PresenceUpdate {
        /// The user whose presence changed.
        user_id: UserId,
        /// New state.
        online: bool,
    },
    /// A persisted chat message (to the recipient, and echoed to the sender).
    #[serde(rename = "receive_message")]
    ReceiveMessage(Message),
    /// The peer `by` read your messages.
    #[serde(rename = "messages_read")]
    MessagesRead {
        /// The reader.
        by: UserId,
    },
    /// The peer `from` is typing.
    #[serde(rename = "typing")]
    Typing {
        /// The typist.
        from: UserId,
    },
    /// The peer `from` stopped typing.
    #[serde(rename = "stop_typing")]
    StopTyping {
        /// The typist.
        from: UserId,
    },
    /// A new persisted notification.
    #[serde(rename = "notification:new")]
    NotificationNew(NotificationWithActor),
}

impl OutboundEvent {
    /// Wire name of the event, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PresenceSnapshot(_) => "presence:snapshot",
            Self::PresenceUpdate { .. } => "presence:update",
            Self::ReceiveMessage(_) => "receive_message",
            Self::MessagesRead { .. } => "messages_read",
            Self::Typing { .. } => "typing",
            Self::StopTyping { .. } => "stop_typing",
            Self::NotificationNew(_) => "notification:new",
        }
    }
}
