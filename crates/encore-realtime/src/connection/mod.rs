//! WebSocket connection lifecycle: handles, pool, presence registry.

pub mod authenticator;
pub mod guard;
pub mod handle;
pub mod manager;
pub mod pool;
pub mod registry;

pub use authenticator::{HandshakeCredentials, WsAuthenticator};
pub use guard::ConnectionGuard;
pub use handle::{ConnectionHandle, ConnectionId};
pub use manager::ConnectionManager;
pub use pool::ConnectionPool;
pub use registry::ConnectionRegistry;
