//! Presence broadcaster task.
//!
//! Consumes registry transitions in order and turns each into a
//! `presence:update` followed by a `presence:snapshot` to every
//! authenticated connection. A periodic heartbeat re-sends the current
//! snapshot so lost frames self-heal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::connection::registry::ConnectionRegistry;
use crate::delivery::fanout::LiveFanout;
use crate::message::types::OutboundEvent;
use crate::metrics::RealtimeMetrics;

use super::snapshot::{PresenceEvent, PresenceSnapshot};

/// Publishes presence changes to all connections.
#[derive(Debug)]
pub struct PresenceBroadcaster {
    fanout: Arc<LiveFanout>,
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<RealtimeMetrics>,
    heartbeat: Duration,
}

impl PresenceBroadcaster {
    /// Creates a broadcaster with the given heartbeat interval.
    pub fn new(
        fanout: Arc<LiveFanout>,
        registry: Arc<ConnectionRegistry>,
        metrics: Arc<RealtimeMetrics>,
        heartbeat: Duration,
    ) -> Self {
        Self {
            fanout,
            registry,
            metrics,
            heartbeat,
        }
    }

    /// Runs until shutdown is signalled or the event stream ends.
    pub async fn run(
        self,
        mut events: mpsc::UnboundedReceiver<PresenceEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let mut ticker = time::interval(self.heartbeat);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        info!(heartbeat_secs = self.heartbeat.as_secs(), "Presence broadcaster started");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                event = events.recv() => match event {
                    Some(event) => self.publish_transition(event),
                    None => break,
                },
                _ = ticker.tick() => self.publish_heartbeat(),
            }
        }

        debug!("Presence broadcaster stopped");
    }

    /// Sends the update then the snapshot captured with it.
    pub fn publish_transition(&self, event: PresenceEvent) {
        let user_id = event.transition.user_id();
        let online = event.transition.is_online();
        info!(user_id = %user_id, online, online_count = event.snapshot.len(), "Presence changed");

        self.fanout
            .to_all(&OutboundEvent::PresenceUpdate { user_id, online });
        self.send_snapshot(event.snapshot);
    }

    /// Re-sends the live snapshot.
    pub fn publish_heartbeat(&self) {
        let snapshot = self.registry.snapshot();
        trace!(online_count = snapshot.len(), "Presence heartbeat");
        self.send_snapshot(snapshot);
    }

    fn send_snapshot(&self, snapshot: PresenceSnapshot) {
        self.fanout
            .to_all(&OutboundEvent::PresenceSnapshot(snapshot.into_inner()));
        self.metrics.presence_broadcast();
    }
}
