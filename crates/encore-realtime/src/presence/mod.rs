//! Presence: who is online, and telling everyone when that changes.

pub mod broadcaster;
pub mod snapshot;

pub use broadcaster::PresenceBroadcaster;
pub use snapshot::{PresenceEvent, PresenceSnapshot, PresenceTransition};
