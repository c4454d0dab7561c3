//! Shared helpers for real-time engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use encore_auth::verifier::{CredentialVerifier, VerifiedIdentity};
use encore_core::config::RealtimeConfig;
use encore_core::error::AppError;
use encore_core::result::AppResult;
use encore_core::types::id::UserId;
use encore_realtime::RealtimeEngine;
use encore_realtime::connection::ConnectionGuard;
use encore_realtime::store::{
    MemoryMessageStore, MemoryNotificationStore, MessageStore, NotificationStore,
};

/// How long to wait for a frame that must arrive.
const RECV_TIMEOUT: Duration = Duration::from_secs(2);
/// Quiet window after which a connection is considered idle.
const QUIET: Duration = Duration::from_millis(150);

/// Accepts tokens of the form `user-<id>`.
pub struct StaticVerifier;

#[async_trait]
impl CredentialVerifier for StaticVerifier {
    async fn verify(&self, raw: &str) -> AppResult<VerifiedIdentity> {
        let id = raw
            .strip_prefix("user-")
            .and_then(|id| id.parse::<i64>().ok())
            .ok_or_else(|| AppError::authentication("Invalid token"))?;
        Ok(VerifiedIdentity {
            user_id: UserId(id),
            display_name: format!("user{id}"),
        })
    }
}

/// Config with the heartbeat pushed out of the way of assertions.
pub fn test_config() -> RealtimeConfig {
    RealtimeConfig {
        presence_heartbeat_seconds: 3600,
        ..RealtimeConfig::default()
    }
}

/// A running engine over in-memory stores.
pub struct TestEngine {
    pub engine: RealtimeEngine,
    pub messages: Arc<MemoryMessageStore>,
    pub notifications: Arc<MemoryNotificationStore>,
}

impl TestEngine {
    pub fn start() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: RealtimeConfig) -> Self {
        let messages = Arc::new(MemoryMessageStore::new());
        let notifications = Arc::new(MemoryNotificationStore::new());
        let engine = RealtimeEngine::start(
            config,
            Arc::new(StaticVerifier),
            messages.clone() as Arc<dyn MessageStore>,
            notifications.clone() as Arc<dyn NotificationStore>,
        );
        Self {
            engine,
            messages,
            notifications,
        }
    }

    /// Engine backed by a caller-supplied message store.
    pub fn with_message_store(store: Arc<dyn MessageStore>) -> Self {
        let notifications = Arc::new(MemoryNotificationStore::new());
        Self::with_stores(store, notifications.clone() as Arc<dyn NotificationStore>)
    }

    /// Engine backed by a caller-supplied notification store.
    pub fn with_notification_store(store: Arc<dyn NotificationStore>) -> Self {
        let messages = Arc::new(MemoryMessageStore::new());
        Self::with_stores(messages as Arc<dyn MessageStore>, store)
    }

    fn with_stores(
        messages: Arc<dyn MessageStore>,
        notifications: Arc<dyn NotificationStore>,
    ) -> Self {
        let engine = RealtimeEngine::start(
            test_config(),
            Arc::new(StaticVerifier),
            messages,
            notifications,
        );
        // The memory handles are unused when the caller supplies the stores.
        Self {
            engine,
            messages: Arc::new(MemoryMessageStore::new()),
            notifications: Arc::new(MemoryNotificationStore::new()),
        }
    }

    /// Accepts a connection for `user` without registering it.
    pub fn connect(&self, user: i64) -> TestClient {
        let identity = VerifiedIdentity {
            user_id: UserId(user),
            display_name: format!("user{user}"),
        };
        let (guard, rx) = self.engine.connections.accept(identity);
        TestClient { guard, rx }
    }

    /// Accepts, registers, and drains the resulting presence traffic.
    pub async fn online(&self, user: i64) -> TestClient {
        let mut client = self.connect(user);
        client.send(serde_json::json!({ "event": "register", "data": user })).await;
        client.drain().await;
        client
    }

    pub fn online_users(&self) -> Vec<i64> {
        self.engine
            .online_users()
            .user_ids()
            .iter()
            .map(|u| u.get())
            .collect()
    }
}

/// One accepted connection and its outbound queue.
pub struct TestClient {
    pub guard: ConnectionGuard,
    rx: mpsc::Receiver<String>,
}

impl TestClient {
    /// Splits off the guard so the connection can be closed while its
    /// queue is still inspected.
    pub fn into_parts(self) -> (ConnectionGuard, mpsc::Receiver<String>) {
        (self.guard, self.rx)
    }

    pub async fn send(&self, frame: Value) {
        self.guard.handle_frame(&frame.to_string()).await;
    }

    pub async fn send_raw(&self, raw: &str) {
        self.guard.handle_frame(raw).await;
    }

    /// Next frame, failing the test if none arrives in time.
    pub async fn recv(&mut self) -> Value {
        let frame = tokio::time::timeout(RECV_TIMEOUT, self.rx.recv())
            .await
            .expect("timed out waiting for frame")
            .expect("connection queue closed");
        serde_json::from_str(&frame).expect("frame is JSON")
    }

    /// Skips frames until one named `event` arrives.
    pub async fn recv_event(&mut self, event: &str) -> Value {
        loop {
            let frame = self.recv().await;
            if frame["event"] == event {
                return frame;
            }
        }
    }

    /// Frames received before the connection went quiet.
    pub async fn collect(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(Some(frame)) = tokio::time::timeout(QUIET, self.rx.recv()).await {
            frames.push(serde_json::from_str(&frame).expect("frame is JSON"));
        }
        frames
    }

    pub async fn drain(&mut self) {
        self.collect().await;
    }

    /// Collected frames named `event`.
    pub async fn collect_event(&mut self, event: &str) -> Vec<Value> {
        self.collect()
            .await
            .into_iter()
            .filter(|f| f["event"] == event)
            .collect()
    }
}
