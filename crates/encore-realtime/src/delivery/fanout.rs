//! Live fan-out of outbound events to connection sets.
//!
//! Each call serializes the event once and queues the same frame on every
//! target. Targets are resolved at call time, never cached across an await.

use std::sync::Arc;

use tracing::error;

use encore_core::types::id::UserId;

use crate::connection::handle::{ConnectionHandle, ConnectionId, SendStatus};
use crate::connection::pool::ConnectionPool;
use crate::connection::registry::ConnectionRegistry;
use crate::message::serializer::serialize_outbound;
use crate::message::types::OutboundEvent;
use crate::metrics::RealtimeMetrics;

/// Resolves recipients and queues frames on their connections.
#[derive(Debug)]
pub struct LiveFanout {
    pool: Arc<ConnectionPool>,
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<RealtimeMetrics>,
}

impl LiveFanout {
    /// Creates a fan-out over the given pool and registry.
    pub fn new(
        pool: Arc<ConnectionPool>,
        registry: Arc<ConnectionRegistry>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            pool,
            registry,
            metrics,
        }
    }

    /// Every registered connection of `user`. Returns how many got the frame.
    pub fn to_user(&self, user: UserId, event: &OutboundEvent) -> usize {
        let targets = self.pool.get_many(&self.registry.connections_for(user));
        self.deliver(&targets, event)
    }

    /// Every registered connection of `user` plus `origin`, each at most once.
    pub fn to_user_and_origin(
        &self,
        user: UserId,
        origin: ConnectionId,
        event: &OutboundEvent,
    ) -> usize {
        let mut ids = self.registry.connections_for(user);
        if !ids.contains(&origin) {
            ids.push(origin);
        }
        let targets = self.pool.get_many(&ids);
        self.deliver(&targets, event)
    }

    /// One connection, registered or not.
    pub fn to_connection(&self, conn_id: ConnectionId, event: &OutboundEvent) -> usize {
        match self.pool.get(&conn_id) {
            Some(handle) => self.deliver(&[handle], event),
            None => 0,
        }
    }

    /// Every authenticated connection in the pool.
    pub fn to_all(&self, event: &OutboundEvent) -> usize {
        let targets = self.pool.all_connections();
        self.deliver(&targets, event)
    }

    fn deliver(&self, targets: &[Arc<ConnectionHandle>], event: &OutboundEvent) -> usize {
        if targets.is_empty() {
            return 0;
        }
        let frame = match serialize_outbound(event) {
            Ok(frame) => frame,
            Err(e) => {
                error!(event = event.name(), error = %e, "Failed to serialize outbound event");
                return 0;
            }
        };

        let mut sent = 0;
        for conn in targets {
            match conn.send(frame.clone()) {
                SendStatus::Queued => sent += 1,
                SendStatus::Full | SendStatus::Closed => self.metrics.frame_dropped(),
            }
        }
        self.metrics.frames_sent(sent as u64);
        sent
    }
}
