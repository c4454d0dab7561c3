//! Presence values produced by the connection registry.

use serde::{Deserialize, Serialize};

use encore_core::types::id::UserId;

/// Sorted set of users with at least one registered connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresenceSnapshot(Vec<UserId>);

impl PresenceSnapshot {
    /// Builds a snapshot from any id order.
    pub fn new(mut ids: Vec<UserId>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    /// Online user ids, ascending.
    pub fn user_ids(&self) -> &[UserId] {
        &self.0
    }

    /// Whether `user` is online in this snapshot.
    pub fn contains(&self, user: UserId) -> bool {
        self.0.binary_search(&user).is_ok()
    }

    /// Number of online users.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nobody is online.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the snapshot into its id list.
    pub fn into_inner(self) -> Vec<UserId> {
        self.0
    }
}

/// A user crossed the zero ↔ nonzero registered-connection boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    /// First registered connection appeared.
    Online(UserId),
    /// Last registered connection went away.
    Offline(UserId),
}

impl PresenceTransition {
    /// The user concerned.
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Online(id) | Self::Offline(id) => *id,
        }
    }

    /// Whether the user is now online.
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online(_))
    }
}

/// A transition together with the online set right after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEvent {
    /// The transition.
    pub transition: PresenceTransition,
    /// Online set immediately after the transition.
    pub snapshot: PresenceSnapshot,
}
