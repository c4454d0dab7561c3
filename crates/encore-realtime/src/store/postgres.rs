//! Store implementations over the Postgres repositories.

use async_trait::async_trait;

use encore_core::result::AppResult;
use encore_core::types::id::{NotificationId, UserId};
use encore_database::repositories::{MessageRepository, NotificationRepository};
use encore_entity::message::{Message, NewMessage};
use encore_entity::notification::{NewNotification, Notification, NotificationWithActor};

use super::{MessageStore, NotificationStore};

#[async_trait]
impl MessageStore for MessageRepository {
    async fn create(&self, new: NewMessage) -> AppResult<Message> {
        MessageRepository::create(self, &new).await
    }

    async fn find_conversation(&self, a: UserId, b: UserId) -> AppResult<Vec<Message>> {
        MessageRepository::find_conversation(self, a, b).await
    }

    async fn mark_read(&self, sender: UserId, receiver: UserId) -> AppResult<u64> {
        MessageRepository::mark_read(self, sender, receiver).await
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create(&self, new: NewNotification) -> AppResult<Notification> {
        NotificationRepository::create(self, &new).await
    }

    async fn find_with_actor(&self, id: NotificationId) -> AppResult<Option<NotificationWithActor>> {
        NotificationRepository::find_with_actor(self, id).await
    }

    async fn list_for_user(
        &self,
        user: UserId,
        limit: usize,
    ) -> AppResult<Vec<NotificationWithActor>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        NotificationRepository::list_for_user(self, user, limit).await
    }

    async fn mark_seen(&self, id: NotificationId, user: UserId) -> AppResult<bool> {
        NotificationRepository::mark_seen(self, id, user).await
    }

    async fn dismiss(&self, id: NotificationId, user: UserId) -> AppResult<bool> {
        NotificationRepository::dismiss(self, id, user).await
    }

    async fn dismiss_all(&self, user: UserId) -> AppResult<u64> {
        NotificationRepository::dismiss_all(self, user).await
    }
}
