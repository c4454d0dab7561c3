//! Connection manager: connection lifecycle and inbound event routing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use encore_auth::verifier::VerifiedIdentity;
use encore_core::config::RealtimeConfig;
use encore_core::error::AppError;

use crate::delivery::fanout::LiveFanout;
use crate::delivery::pipeline::MessagePipeline;
use crate::message::serializer::deserialize_inbound;
use crate::message::types::{InboundEvent, OutboundEvent};
use crate::message::validator::validate_frame;
use crate::metrics::RealtimeMetrics;

use super::guard::ConnectionGuard;
use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;
use super::registry::ConnectionRegistry;

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    pool: Arc<ConnectionPool>,
    registry: Arc<ConnectionRegistry>,
    fanout: Arc<LiveFanout>,
    pipeline: Arc<MessagePipeline>,
    metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        pool: Arc<ConnectionPool>,
        registry: Arc<ConnectionRegistry>,
        fanout: Arc<LiveFanout>,
        pipeline: Arc<MessagePipeline>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            pool,
            registry,
            fanout,
            pipeline,
            metrics,
            config,
        }
    }

    /// Admits an authenticated connection.
    ///
    /// The connection joins the pool (so it hears presence broadcasts) and
    /// immediately gets the current `presence:snapshot`. It is not part of
    /// presence until it sends `register`. Dropping the returned guard tears
    /// everything down.
    pub fn accept(
        self: &Arc<Self>,
        identity: VerifiedIdentity,
    ) -> (ConnectionGuard, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.outbound_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(
            identity.user_id,
            identity.display_name,
            tx,
        ));

        self.pool.add(handle.clone());
        self.metrics.connection_opened();
        self.fanout.to_connection(
            handle.id,
            &OutboundEvent::PresenceSnapshot(self.registry.snapshot().into_inner()),
        );

        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            username = %handle.display_name,
            "WebSocket connection accepted"
        );

        (ConnectionGuard::new(handle, self.clone()), rx)
    }

    /// Removes a connection from presence and the pool. Idempotent.
    pub fn release(&self, conn_id: &ConnectionId) {
        self.registry.unregister(conn_id);
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.close();
            self.metrics.connection_closed();
            let lifetime = chrono::Utc::now() - handle.connected_at;
            info!(
                conn_id = %conn_id,
                user_id = %handle.user_id,
                duration_secs = lifetime.num_seconds(),
                "WebSocket connection released"
            );
        }
    }

    /// Processes one inbound text frame. Failures are logged and isolated to
    /// this frame; the connection stays open.
    pub async fn handle_frame(&self, handle: &ConnectionHandle, raw: &str) {
        let event = match validate_frame(raw, self.config.max_frame_bytes)
            .and_then(|()| deserialize_inbound(raw))
        {
            Ok(event) => event,
            Err(e) => {
                self.metrics.event_rejected();
                debug!(conn_id = %handle.id, error = %e, "Inbound frame rejected");
                return;
            }
        };

        self.metrics.event_received();
        let name = event.name();
        if let Err(e) = self.dispatch(handle, event).await {
            warn!(conn_id = %handle.id, user_id = %handle.user_id, event = name, error = %e, "Inbound event failed");
        }
    }

    async fn dispatch(&self, handle: &ConnectionHandle, event: InboundEvent) -> Result<(), AppError> {
        match event {
            InboundEvent::Register(claimed) => {
                if let Some(claimed) = claimed.filter(|id| *id != handle.user_id) {
                    self.metrics.event_rejected();
                    warn!(
                        conn_id = %handle.id,
                        user_id = %handle.user_id,
                        claimed = %claimed,
                        "Register for another user ignored"
                    );
                    return Ok(());
                }
                self.registry.register(handle.user_id, handle.id);
                debug!(conn_id = %handle.id, user_id = %handle.user_id, "Connection registered for presence");
            }
            InboundEvent::SendMessage(payload) => {
                if self.config.require_registration_to_send && !self.registry.is_registered(&handle.id)
                {
                    debug!(conn_id = %handle.id, "send_message before register dropped");
                    return Ok(());
                }
                self.pipeline
                    .send_message(handle.user_id, Some(handle.id), payload)
                    .await?;
            }
            InboundEvent::Typing(payload) => {
                self.pipeline.relay_typing(handle.user_id, payload.to, true);
            }
            InboundEvent::StopTyping(payload) => {
                self.pipeline.relay_typing(handle.user_id, payload.to, false);
            }
            InboundEvent::ReadMessages(payload) => {
                self.pipeline
                    .read_messages(handle.user_id, payload.from)
                    .await?;
            }
        }
        Ok(())
    }

    /// Closes every connection (shutdown).
    pub fn close_all(&self) {
        let all = self.pool.drain();
        for conn in &all {
            self.registry.unregister(&conn.id);
            conn.close();
            self.metrics.connection_closed();
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// Returns a reference to the presence registry.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }
}
