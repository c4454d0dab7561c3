//! Real-time WebSocket engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Interval of the unconditional `presence:snapshot` re-broadcast.
    #[serde(default = "default_presence_heartbeat")]
    pub presence_heartbeat_seconds: u64,
    /// Outbound frame queue capacity per connection.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// Maximum presence-registered connections per user (0 = unlimited).
    #[serde(default)]
    pub max_connections_per_user: usize,
    /// Largest inbound text frame accepted, in bytes.
    #[serde(default = "default_max_frame")]
    pub max_frame_bytes: usize,
    /// Whether a connection must send `register` before it may send messages.
    #[serde(default)]
    pub require_registration_to_send: bool,
    /// Notification-specific settings.
    #[serde(default)]
    pub notifications: NotificationRealtimeConfig,
}

impl RealtimeConfig {
    /// Heartbeat interval as a [`Duration`], never zero.
    pub fn presence_heartbeat(&self) -> Duration {
        Duration::from_secs(self.presence_heartbeat_seconds.max(1))
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            presence_heartbeat_seconds: default_presence_heartbeat(),
            outbound_buffer_size: default_outbound_buffer(),
            max_connections_per_user: 0,
            max_frame_bytes: default_max_frame(),
            require_registration_to_send: false,
            notifications: NotificationRealtimeConfig::default(),
        }
    }
}

/// Notification delivery settings for the real-time engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationRealtimeConfig {
    /// Also create a `message` notification for every delivered chat message.
    #[serde(default)]
    pub notify_on_message: bool,
}

fn default_presence_heartbeat() -> u64 {
    10
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_max_frame() -> usize {
    65_536
}
