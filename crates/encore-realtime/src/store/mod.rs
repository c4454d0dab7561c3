//! Persistence seams used by the delivery pipeline and the REST layer.
//!
//! The engine only ever talks to these traits. Production wires in the
//! Postgres repositories; tests and the `memory` backend use
//! [`memory::MemoryMessageStore`] and [`memory::MemoryNotificationStore`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use encore_core::result::AppResult;
use encore_core::types::id::{NotificationId, UserId};
use encore_entity::message::{Message, NewMessage};
use encore_entity::notification::{NewNotification, Notification, NotificationWithActor};

pub use memory::{MemoryMessageStore, MemoryNotificationStore};

/// Durable chat message storage.
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    /// Insert an unread message and return the stored row.
    async fn create(&self, new: NewMessage) -> AppResult<Message>;

    /// Both directions between `a` and `b`, ascending by creation time.
    async fn find_conversation(&self, a: UserId, b: UserId) -> AppResult<Vec<Message>>;

    /// Flip every unread `sender → receiver` message to read. Returns the
    /// number of rows changed.
    async fn mark_read(&self, sender: UserId, receiver: UserId) -> AppResult<u64>;
}

/// Durable notification storage.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Insert an unseen, undismissed notification.
    async fn create(&self, new: NewNotification) -> AppResult<Notification>;

    /// Load one notification joined with its actor.
    async fn find_with_actor(&self, id: NotificationId) -> AppResult<Option<NotificationWithActor>>;

    /// Newest non-dismissed notifications of `user`, at most `limit`.
    async fn list_for_user(&self, user: UserId, limit: usize)
    -> AppResult<Vec<NotificationWithActor>>;

    /// Mark one of `user`'s notifications seen.
    async fn mark_seen(&self, id: NotificationId, user: UserId) -> AppResult<bool>;

    /// Dismiss one of `user`'s notifications.
    async fn dismiss(&self, id: NotificationId, user: UserId) -> AppResult<bool>;

    /// Dismiss all of `user`'s open notifications.
    async fn dismiss_all(&self, user: UserId) -> AppResult<u64>;
}
