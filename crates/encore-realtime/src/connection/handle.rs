//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

use encore_core::types::id::UserId;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// Result of queueing a frame on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// Frame queued for the writer task.
    Queued,
    /// Buffer full; frame dropped, connection kept.
    Full,
    /// Connection gone.
    Closed,
}

/// A handle to a single authenticated WebSocket connection.
///
/// The user identity is fixed at handshake time and never changes.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this connection
    pub user_id: UserId,
    /// Display name from the credential (cached for logs)
    pub display_name: String,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<String>,
    closed: CancellationToken,
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(user_id: UserId, display_name: String, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            display_name,
            connected_at: Utc::now(),
            sender,
            closed: CancellationToken::new(),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue a serialized frame without waiting.
    pub fn send(&self, frame: String) -> SendStatus {
        if !self.is_alive() {
            return SendStatus::Closed;
        }
        match self.sender.try_send(frame) {
            Ok(()) => SendStatus::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping frame");
                SendStatus::Full
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                SendStatus::Closed
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Mark the connection closed and wake its socket tasks.
    pub fn close(&self) {
        self.mark_dead();
        self.closed.cancel();
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.closed.cancelled()
    }
}
