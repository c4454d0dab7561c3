//! Realtime engine counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level counters. All updates are relaxed; readers only need a
/// roughly consistent view for the health endpoint and logs.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_total: AtomicU64,
    connections_active: AtomicU64,
    events_received: AtomicU64,
    events_rejected: AtomicU64,
    frames_sent: AtomicU64,
    frames_dropped: AtomicU64,
    messages_persisted: AtomicU64,
    notifications_created: AtomicU64,
    notifications_pushed: AtomicU64,
    presence_broadcasts: AtomicU64,
}

impl RealtimeMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection passed the handshake.
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// A connection was torn down.
    pub fn connection_closed(&self) {
        // Saturating: a double close must not wrap the gauge.
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// An inbound frame was dispatched.
    pub fn event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    /// An inbound frame was malformed, oversized, or failed validation.
    pub fn event_rejected(&self) {
        self.events_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Frames queued onto connection buffers.
    pub fn frames_sent(&self, count: u64) {
        self.frames_sent.fetch_add(count, Ordering::Relaxed);
    }

    /// A frame was dropped because the connection buffer was full or closed.
    pub fn frame_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// A chat message was persisted.
    pub fn message_persisted(&self) {
        self.messages_persisted.fetch_add(1, Ordering::Relaxed);
    }

    /// A notification row was created.
    pub fn notification_created(&self) {
        self.notifications_created.fetch_add(1, Ordering::Relaxed);
    }

    /// A notification reached at least one live connection.
    pub fn notification_pushed(&self) {
        self.notifications_pushed.fetch_add(1, Ordering::Relaxed);
    }

    /// A presence update or snapshot went out to all connections.
    pub fn presence_broadcast(&self) {
        self.presence_broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            events_received: self.events_received.load(Ordering::Relaxed),
            events_rejected: self.events_rejected.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            messages_persisted: self.messages_persisted.load(Ordering::Relaxed),
            notifications_created: self.notifications_created.load(Ordering::Relaxed),
            notifications_pushed: self.notifications_pushed.load(Ordering::Relaxed),
            presence_broadcasts: self.presence_broadcasts.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever accepted.
    pub connections_total: u64,
    /// Connections currently open.
    pub connections_active: u64,
    /// Inbound events dispatched.
    pub events_received: u64,
    /// Inbound frames rejected.
    pub events_rejected: u64,
    /// Outbound frames queued.
    pub frames_sent: u64,
    /// Outbound frames dropped.
    pub frames_dropped: u64,
    /// Chat messages persisted.
    pub messages_persisted: u64,
    /// Notifications created.
    pub notifications_created: u64,
    /// Notifications pushed live.
    pub notifications_pushed: u64,
    /// Presence broadcasts sent.
    pub presence_broadcasts: u64,
}
