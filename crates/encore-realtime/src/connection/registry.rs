//! Connection registry: the authoritative user → registered-connections map.
//!
//! A user is online exactly when they have at least one registered
//! connection. Every mutation runs under a single lock, and the resulting
//! [`PresenceEvent`] is queued before the lock is released, so transitions
//! reach the broadcaster in the order they happened.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use encore_core::types::id::UserId;

use super::handle::ConnectionId;
use crate::presence::snapshot::{PresenceEvent, PresenceSnapshot, PresenceTransition};

#[derive(Debug, Default)]
struct RegistryState {
    /// User → registered connections, oldest first.
    by_user: HashMap<UserId, Vec<ConnectionId>>,
    /// Registered connection → owner.
    by_conn: HashMap<ConnectionId, UserId>,
}

impl RegistryState {
    fn snapshot(&self) -> PresenceSnapshot {
        PresenceSnapshot::new(self.by_user.keys().copied().collect())
    }

    /// Removes `conn_id`; reports the owner if this emptied their set.
    fn detach(&mut self, conn_id: &ConnectionId) -> Option<(UserId, bool)> {
        let user_id = self.by_conn.remove(conn_id)?;
        let emptied = match self.by_user.get_mut(&user_id) {
            Some(conns) => {
                conns.retain(|c| c != conn_id);
                conns.is_empty()
            }
            None => true,
        };
        if emptied {
            self.by_user.remove(&user_id);
        }
        Some((user_id, emptied))
    }
}

/// Tracks which connections opted into presence, per user.
#[derive(Debug)]
pub struct ConnectionRegistry {
    state: Mutex<RegistryState>,
    events: mpsc::UnboundedSender<PresenceEvent>,
    /// 0 = unlimited.
    max_per_user: usize,
}

impl ConnectionRegistry {
    /// Creates a registry publishing transitions on `events`.
    pub fn new(events: mpsc::UnboundedSender<PresenceEvent>, max_per_user: usize) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            events,
            max_per_user,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, state: &RegistryState, transition: PresenceTransition) {
        let event = PresenceEvent {
            transition,
            snapshot: state.snapshot(),
        };
        if self.events.send(event).is_err() {
            debug!("Presence broadcaster gone, transition not published");
        }
    }

    /// Adds `conn_id` to `user_id`'s set.
    ///
    /// Returns the transition if the user just came online. Registering a
    /// connection twice is a no-op. When the per-user cap is reached the
    /// oldest registration is dropped from presence (the transport stays
    /// open).
    pub fn register(&self, user_id: UserId, conn_id: ConnectionId) -> Option<PresenceTransition> {
        let mut state = self.lock();

        if let Some(owner) = state.by_conn.get(&conn_id) {
            if *owner != user_id {
                warn!(conn_id = %conn_id, owner = %owner, user_id = %user_id, "Connection already registered to another user");
            }
            return None;
        }

        let conns = state.by_user.entry(user_id).or_default();
        let came_online = conns.is_empty();
        conns.push(conn_id);
        let evicted = if self.max_per_user > 0 && conns.len() > self.max_per_user {
            Some(conns.remove(0))
        } else {
            None
        };
        state.by_conn.insert(conn_id, user_id);
        if let Some(old) = evicted {
            state.by_conn.remove(&old);
            warn!(user_id = %user_id, evicted = %old, max = self.max_per_user, "User at max registered connections, oldest evicted from presence");
        }

        if came_online {
            let transition = PresenceTransition::Online(user_id);
            self.publish(&state, transition);
            Some(transition)
        } else {
            None
        }
    }

    /// Removes `conn_id` wherever it is registered.
    ///
    /// Returns the transition if its owner just went offline. Unknown ids
    /// are a no-op, so calling this twice is safe.
    pub fn unregister(&self, conn_id: &ConnectionId) -> Option<PresenceTransition> {
        let mut state = self.lock();
        let (user_id, emptied) = state.detach(conn_id)?;
        if emptied {
            let transition = PresenceTransition::Offline(user_id);
            self.publish(&state, transition);
            Some(transition)
        } else {
            None
        }
    }

    /// Registered connections of `user_id`, oldest first.
    pub fn connections_for(&self, user_id: UserId) -> Vec<ConnectionId> {
        self.lock()
            .by_user
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `conn_id` has registered.
    pub fn is_registered(&self, conn_id: &ConnectionId) -> bool {
        self.lock().by_conn.contains_key(conn_id)
    }

    /// Whether `user_id` is online.
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.lock().by_user.contains_key(&user_id)
    }

    /// Current online set.
    pub fn snapshot(&self) -> PresenceSnapshot {
        self.lock().snapshot()
    }

    /// Number of online users.
    pub fn online_count(&self) -> usize {
        self.lock().by_user.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn registry(max: usize) -> (ConnectionRegistry, mpsc::UnboundedReceiver<PresenceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionRegistry::new(tx, max), rx)
    }

    #[test]
    fn test_first_register_goes_online() {
        let (reg, mut rx) = registry(0);
        let c1 = Uuid::new_v4();
        assert_eq!(
            reg.register(UserId(7), c1),
            Some(PresenceTransition::Online(UserId(7)))
        );
        assert_eq!(reg.register(UserId(7), c1), None);
        assert_eq!(reg.register(UserId(7), Uuid::new_v4()), None);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.transition, PresenceTransition::Online(UserId(7)));
        assert_eq!(event.snapshot.user_ids(), &[UserId(7)]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_offline_only_after_last_connection() {
        let (reg, mut rx) = registry(0);
        let (c1, c2) = (Uuid::new_v4(), Uuid::new_v4());
        reg.register(UserId(7), c1);
        reg.register(UserId(7), c2);
        let _ = rx.try_recv();

        assert_eq!(reg.unregister(&c1), None);
        assert!(reg.is_online(UserId(7)));
        assert!(rx.try_recv().is_err());

        assert_eq!(
            reg.unregister(&c2),
            Some(PresenceTransition::Offline(UserId(7)))
        );
        assert!(!reg.is_online(UserId(7)));
        let event = rx.try_recv().unwrap();
        assert!(event.snapshot.is_empty());
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let (reg, mut rx) = registry(0);
        assert_eq!(reg.unregister(&Uuid::new_v4()), None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_cap_evicts_oldest_without_transition() {
        let (reg, _rx) = registry(2);
        let (c1, c2, c3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        reg.register(UserId(7), c1);
        reg.register(UserId(7), c2);
        assert_eq!(reg.register(UserId(7), c3), None);

        assert_eq!(reg.connections_for(UserId(7)), vec![c2, c3]);
        assert!(!reg.is_registered(&c1));
        assert_eq!(reg.unregister(&c1), None);
    }

    #[test]
    fn test_connection_cannot_move_between_users() {
        let (reg, _rx) = registry(0);
        let c1 = Uuid::new_v4();
        reg.register(UserId(7), c1);
        assert_eq!(reg.register(UserId(9), c1), None);
        assert!(!reg.is_online(UserId(9)));
        assert_eq!(reg.snapshot().user_ids(), &[UserId(7)]);
    }

    #[test]
    fn test_concurrent_churn_converges() {
        let (reg, _rx) = registry(0);
        let reg = std::sync::Arc::new(reg);
        let threads: Vec<_> = (0..8)
            .map(|i| {
                let reg = reg.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let c = Uuid::new_v4();
                        reg.register(UserId(i % 3), c);
                        reg.unregister(&c);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(reg.online_count(), 0);
    }
}
