//! Chat delivery: persist first, then route to live connections.

use std::sync::Arc;

use tracing::{debug, warn};

use encore_core::result::AppResult;
use encore_core::types::id::UserId;
use encore_entity::message::Message;
use encore_entity::notification::{NewNotification, NotificationType};

use crate::connection::handle::ConnectionId;
use crate::message::types::{OutboundEvent, SendMessagePayload};
use crate::message::validator::validate_send;
use crate::metrics::RealtimeMetrics;
use crate::notification::NotificationDispatcher;
use crate::store::MessageStore;

use super::fanout::LiveFanout;

/// Longest message preview copied into a `message` notification.
const PREVIEW_CHARS: usize = 120;

/// What happened to a `send_message` intent.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Failed validation; nothing stored or sent.
    Dropped,
    /// Stored and routed.
    Delivered {
        /// The stored message.
        message: Message,
        /// Recipient connections that received it (0 = offline).
        recipient_connections: usize,
        /// Sender connections that received the echo.
        echo_connections: usize,
    },
}

/// Routes chat intents through persistence and live delivery.
pub struct MessagePipeline {
    store: Arc<dyn MessageStore>,
    fanout: Arc<LiveFanout>,
    notifications: Arc<NotificationDispatcher>,
    metrics: Arc<RealtimeMetrics>,
    notify_on_message: bool,
}

impl std::fmt::Debug for MessagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagePipeline")
            .field("notify_on_message", &self.notify_on_message)
            .finish()
    }
}

impl MessagePipeline {
    /// Creates a pipeline.
    pub fn new(
        store: Arc<dyn MessageStore>,
        fanout: Arc<LiveFanout>,
        notifications: Arc<NotificationDispatcher>,
        metrics: Arc<RealtimeMetrics>,
        notify_on_message: bool,
    ) -> Self {
        Self {
            store,
            fanout,
            notifications,
            metrics,
            notify_on_message,
        }
    }

    /// Persists a message from `sender` and delivers it.
    ///
    /// The recipient gets `receive_message` on every registered connection;
    /// the sender gets the same stored row as an echo on their registered
    /// connections and on `origin` (the socket it came from, if any).
    /// Recipients are looked up after the write completes. If the write
    /// fails nothing is sent.
    pub async fn send_message(
        &self,
        sender: UserId,
        origin: Option<ConnectionId>,
        payload: SendMessagePayload,
    ) -> AppResult<SendOutcome> {
        let new = match validate_send(sender, payload) {
            Ok(new) => new,
            Err(e) => {
                debug!(user_id = %sender, reason = %e.message, "send_message dropped");
                return Ok(SendOutcome::Dropped);
            }
        };

        let message = self.store.create(new).await?;
        self.metrics.message_persisted();

        let event = OutboundEvent::ReceiveMessage(message.clone());
        let recipient = message.receiver_id;
        let recipient_connections = if recipient == sender {
            0
        } else {
            self.fanout.to_user(recipient, &event)
        };
        let echo_connections = match origin {
            Some(origin) => self.fanout.to_user_and_origin(sender, origin, &event),
            None => self.fanout.to_user(sender, &event),
        };

        debug!(
            message_id = %message.id,
            from = %sender,
            to = %recipient,
            recipient_connections,
            echo_connections,
            "Message delivered"
        );

        if self.notify_on_message && recipient != sender {
            self.notify_recipient(&message).await;
        }

        Ok(SendOutcome::Delivered {
            message,
            recipient_connections,
            echo_connections,
        })
    }

    async fn notify_recipient(&self, message: &Message) {
        let preview = message
            .content
            .as_deref()
            .map(|c| c.chars().take(PREVIEW_CHARS).collect::<String>());
        let request = NewNotification {
            user_id: message.receiver_id,
            from_user_id: message.sender_id,
            kind: NotificationType::Message,
            post_id: None,
            comment_id: None,
            content: preview,
        };
        // The message itself is already stored and delivered.
        if let Err(e) = self.notifications.notify(request).await {
            warn!(message_id = %message.id, error = %e, "Message notification failed");
        }
    }

    /// Relays `typing` / `stop_typing` from `from` to `to`. Nothing is stored.
    pub fn relay_typing(&self, from: UserId, to: UserId, started: bool) -> usize {
        let event = if started {
            OutboundEvent::Typing { from }
        } else {
            OutboundEvent::StopTyping { from }
        };
        self.fanout.to_user(to, &event)
    }

    /// `reader` has read everything `sender` sent them.
    ///
    /// Flips the rows to read, then tells `sender`'s live connections with
    /// one `messages_read`. Returns the number of rows changed.
    pub async fn read_messages(&self, reader: UserId, sender: UserId) -> AppResult<u64> {
        let changed = self.store.mark_read(sender, reader).await?;
        let notified = self
            .fanout
            .to_user(sender, &OutboundEvent::MessagesRead { by: reader });
        debug!(reader = %reader, sender = %sender, changed, notified, "Messages marked read");
        Ok(changed)
    }

    /// Conversation history between two users, oldest first.
    pub async fn conversation(&self, a: UserId, b: UserId) -> AppResult<Vec<Message>> {
        self.store.find_conversation(a, b).await
    }
}
