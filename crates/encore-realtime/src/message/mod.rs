//! WebSocket wire protocol.

pub mod serializer;
pub mod types;
pub mod validator;

pub use types::{InboundEvent, OutboundEvent};
