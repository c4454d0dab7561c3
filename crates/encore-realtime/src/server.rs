//! Top-level real-time engine that ties together all subsystems.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use encore_auth::verifier::CredentialVerifier;
use encore_core::config::RealtimeConfig;

use crate::connection::authenticator::WsAuthenticator;
use crate::connection::manager::ConnectionManager;
use crate::connection::pool::ConnectionPool;
use crate::connection::registry::ConnectionRegistry;
use crate::delivery::fanout::LiveFanout;
use crate::delivery::pipeline::MessagePipeline;
use crate::metrics::RealtimeMetrics;
use crate::notification::dispatcher::NotificationDispatcher;
use crate::presence::broadcaster::PresenceBroadcaster;
use crate::presence::snapshot::PresenceSnapshot;
use crate::store::{MessageStore, NotificationStore};

/// Central real-time engine that coordinates all WebSocket subsystems.
///
/// Everything here is shared state behind `Arc`s; there are no globals, so
/// tests can run several engines side by side.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Presence registry.
    pub registry: Arc<ConnectionRegistry>,
    /// Chat delivery pipeline.
    pub messages: Arc<MessagePipeline>,
    /// Notification dispatcher.
    pub notifications: Arc<NotificationDispatcher>,
    /// Handshake authenticator.
    pub authenticator: Arc<WsAuthenticator>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
    broadcaster: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Builds the engine and spawns the presence broadcaster.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        config: RealtimeConfig,
        verifier: Arc<dyn CredentialVerifier>,
        message_store: Arc<dyn MessageStore>,
        notification_store: Arc<dyn NotificationStore>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (presence_tx, presence_rx) = mpsc::unbounded_channel();

        let metrics = Arc::new(RealtimeMetrics::new());
        let pool = Arc::new(ConnectionPool::new());
        let registry = Arc::new(ConnectionRegistry::new(
            presence_tx,
            config.max_connections_per_user,
        ));
        let fanout = Arc::new(LiveFanout::new(
            pool.clone(),
            registry.clone(),
            metrics.clone(),
        ));
        let notifications = Arc::new(NotificationDispatcher::new(
            notification_store,
            fanout.clone(),
            metrics.clone(),
        ));
        let messages = Arc::new(MessagePipeline::new(
            message_store,
            fanout.clone(),
            notifications.clone(),
            metrics.clone(),
            config.notifications.notify_on_message,
        ));
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            pool,
            registry.clone(),
            fanout.clone(),
            messages.clone(),
            metrics.clone(),
        ));

        let broadcaster = PresenceBroadcaster::new(
            fanout,
            registry.clone(),
            metrics.clone(),
            config.presence_heartbeat(),
        );
        let task = tokio::spawn(broadcaster.run(presence_rx, shutdown_tx.subscribe()));

        info!("Real-time engine initialized");

        Self {
            connections,
            registry,
            messages,
            notifications,
            authenticator: Arc::new(WsAuthenticator::new(verifier)),
            metrics,
            shutdown_tx,
            broadcaster: Arc::new(Mutex::new(Some(task))),
        }
    }

    /// Current online set.
    pub fn online_users(&self) -> PresenceSnapshot {
        self.registry.snapshot()
    }

    /// Stops the broadcaster and closes every connection.
    pub async fn shutdown(&self) {
        info!("Shutting down real-time engine");

        let _ = self.shutdown_tx.send(());
        self.connections.close_all();

        let task = self
            .broadcaster
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Presence broadcaster ended abnormally");
            }
        }

        info!("Real-time engine shut down");
    }
}
