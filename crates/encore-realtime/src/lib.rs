//! # encore-realtime
//!
//! Real-time engine for Encore. Provides:
//!
//! - Authenticated WebSocket connection lifecycle
//! - Presence tracking with ordered online/offline broadcasts and a
//!   periodic snapshot heartbeat
//! - Direct-message delivery (persist, then route to live connections)
//! - Typing indicators and read receipts
//! - Notification fan-out with actor enrichment
//! - Store traits with Postgres and in-memory implementations

pub mod connection;
pub mod delivery;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod presence;
pub mod server;
pub mod store;

pub use connection::manager::ConnectionManager;
pub use delivery::pipeline::MessagePipeline;
pub use notification::dispatcher::NotificationDispatcher;
pub use presence::snapshot::PresenceSnapshot;
pub use server::RealtimeEngine;
