//! Scope guard tying a connection's registrations to its socket task.

use std::sync::Arc;

use super::handle::{ConnectionHandle, ConnectionId};
use super::manager::ConnectionManager;

/// Owns one accepted connection. On drop (normal close, error, or a
/// panicking socket task) the connection leaves presence and the pool.
#[derive(Debug)]
pub struct ConnectionGuard {
    handle: Arc<ConnectionHandle>,
    manager: Arc<ConnectionManager>,
}

impl ConnectionGuard {
    pub(crate) fn new(handle: Arc<ConnectionHandle>, manager: Arc<ConnectionManager>) -> Self {
        Self { handle, manager }
    }

    /// The guarded connection.
    pub fn handle(&self) -> &Arc<ConnectionHandle> {
        &self.handle
    }

    /// Shorthand for `handle().id`.
    pub fn id(&self) -> ConnectionId {
        self.handle.id
    }

    /// Feeds one inbound text frame through the manager.
    pub async fn handle_frame(&self, raw: &str) {
        self.manager.handle_frame(&self.handle, raw).await;
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.manager.release(&self.handle.id);
    }
}
