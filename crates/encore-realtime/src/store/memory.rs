//! In-process stores for tests and single-node development.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::RwLock;

use encore_core::result::AppResult;
use encore_core::types::id::{MessageId, NotificationId, UserId};
use encore_entity::message::{Message, NewMessage};
use encore_entity::notification::{NewNotification, Notification, NotificationWithActor};
use encore_entity::user::ActorSummary;

use super::{MessageStore, NotificationStore};

/// Messages kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    rows: RwLock<Vec<Message>>,
    next_id: AtomicI64,
}

impl MemoryMessageStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored message, oldest first.
    pub async fn all(&self) -> Vec<Message> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn create(&self, new: NewMessage) -> AppResult<Message> {
        let message = Message {
            id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            sender_id: new.sender_id,
            receiver_id: new.receiver_id,
            content: new.content,
            file_url: new.file_url,
            kind: new.kind,
            read: false,
            created_at: Utc::now(),
        };
        self.rows.write().await.push(message.clone());
        Ok(message)
    }

    async fn find_conversation(&self, a: UserId, b: UserId) -> AppResult<Vec<Message>> {
        let mut conversation: Vec<Message> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.receiver_id == b) || (m.sender_id == b && m.receiver_id == a)
            })
            .cloned()
            .collect();
        conversation.sort_by_key(|m| (m.created_at, m.id));
        Ok(conversation)
    }

    async fn mark_read(&self, sender: UserId, receiver: UserId) -> AppResult<u64> {
        let mut rows = self.rows.write().await;
        let mut changed = 0;
        for m in rows
            .iter_mut()
            .filter(|m| m.sender_id == sender && m.receiver_id == receiver && !m.read)
        {
            m.read = true;
            changed += 1;
        }
        Ok(changed)
    }
}

/// Notifications plus a small actor directory standing in for the users table.
#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    rows: RwLock<Vec<Notification>>,
    actors: DashMap<UserId, ActorSummary>,
    next_id: AtomicI64,
}

impl MemoryNotificationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the display profile used when joining actors.
    pub fn upsert_actor(&self, actor: ActorSummary) {
        self.actors.insert(actor.id, actor);
    }

    /// Every stored notification, including dismissed ones.
    pub async fn all(&self) -> Vec<Notification> {
        self.rows.read().await.clone()
    }

    fn join(&self, notification: Notification) -> NotificationWithActor {
        let actor = self
            .actors
            .get(&notification.from_user_id)
            .map(|a| a.value().clone())
            .unwrap_or_else(|| ActorSummary::unknown(notification.from_user_id));
        NotificationWithActor::new(notification, actor)
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, new: NewNotification) -> AppResult<Notification> {
        let notification = Notification {
            id: NotificationId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            user_id: new.user_id,
            from_user_id: new.from_user_id,
            kind: new.kind,
            post_id: new.post_id,
            comment_id: new.comment_id,
            content: new.content,
            seen: false,
            dismissed: false,
            created_at: Utc::now(),
        };
        self.rows.write().await.push(notification.clone());
        Ok(notification)
    }

    async fn find_with_actor(&self, id: NotificationId) -> AppResult<Option<NotificationWithActor>> {
        let found = self.rows.read().await.iter().find(|n| n.id == id).cloned();
        Ok(found.map(|n| self.join(n)))
    }

    async fn list_for_user(
        &self,
        user: UserId,
        limit: usize,
    ) -> AppResult<Vec<NotificationWithActor>> {
        let mut open: Vec<Notification> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|n| n.user_id == user && !n.dismissed)
            .cloned()
            .collect();
        open.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        open.truncate(limit);
        Ok(open.into_iter().map(|n| self.join(n)).collect())
    }

    async fn mark_seen(&self, id: NotificationId, user: UserId) -> AppResult<bool> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|n| n.id == id && n.user_id == user) {
            Some(n) if !n.seen => {
                n.seen = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn dismiss(&self, id: NotificationId, user: UserId) -> AppResult<bool> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|n| n.id == id && n.user_id == user) {
            Some(n) if !n.dismissed => {
                n.dismissed = true;
                n.seen = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn dismiss_all(&self, user: UserId) -> AppResult<u64> {
        let mut rows = self.rows.write().await;
        let mut changed = 0;
        for n in rows.iter_mut().filter(|n| n.user_id == user && !n.dismissed) {
            n.dismissed = true;
            n.seen = true;
            changed += 1;
        }
        Ok(changed)
    }
}
