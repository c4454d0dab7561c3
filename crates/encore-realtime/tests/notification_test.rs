//! Integration tests for notification persistence and live fan-out.

mod common;

use std::sync::Arc;

use async_trait::async_trait;

use encore_core::config::{NotificationRealtimeConfig, RealtimeConfig};
use encore_core::error::{AppError, ErrorKind};
use encore_core::result::AppResult;
use encore_core::types::id::{NotificationId, UserId};
use encore_entity::notification::{
    NewNotification, Notification, NotificationType, NotificationWithActor,
};
use encore_entity::user::ActorSummary;
use encore_realtime::notification::NotifyOutcome;
use encore_realtime::store::NotificationStore;

use common::{TestEngine, test_config};

fn like(recipient: i64, actor: i64) -> NewNotification {
    NewNotification {
        user_id: UserId(recipient),
        from_user_id: UserId(actor),
        kind: NotificationType::PostLiked,
        post_id: Some(11),
        comment_id: None,
        content: None,
    }
}

fn alice_profile() -> ActorSummary {
    ActorSummary {
        id: UserId(7),
        username: Some("alice".to_string()),
        spotify_display_name: None,
        avatar_url: Some("https://img/alice.png".to_string()),
        profile_image: None,
        spotify_profile_image: None,
    }
}

/// Store whose every call fails.
struct FailingNotificationStore;

#[async_trait]
impl NotificationStore for FailingNotificationStore {
    async fn create(&self, _new: NewNotification) -> AppResult<Notification> {
        Err(AppError::database("insert failed"))
    }

    async fn find_with_actor(&self, _id: NotificationId) -> AppResult<Option<NotificationWithActor>> {
        Err(AppError::database("select failed"))
    }

    async fn list_for_user(
        &self,
        _user: UserId,
        _limit: usize,
    ) -> AppResult<Vec<NotificationWithActor>> {
        Err(AppError::database("select failed"))
    }

    async fn mark_seen(&self, _id: NotificationId, _user: UserId) -> AppResult<bool> {
        Err(AppError::database("update failed"))
    }

    async fn dismiss(&self, _id: NotificationId, _user: UserId) -> AppResult<bool> {
        Err(AppError::database("update failed"))
    }

    async fn dismiss_all(&self, _user: UserId) -> AppResult<u64> {
        Err(AppError::database("update failed"))
    }
}

#[tokio::test]
async fn test_online_recipient_gets_enriched_payload() {
    let app = TestEngine::start();
    app.notifications.upsert_actor(alice_profile());
    let mut bob = app.online(9).await;

    let outcome = app.engine.notifications.notify(like(9, 7)).await.unwrap();
    match outcome {
        NotifyOutcome::Stored {
            live_connections, ..
        } => assert_eq!(live_connections, 1),
        other => panic!("expected stored, got {other:?}"),
    }

    let frame = bob.recv_event("notification:new").await;
    let data = &frame["data"];
    assert_eq!(data["userId"], 9);
    assert_eq!(data["fromUserId"], 7);
    assert_eq!(data["type"], "post_liked");
    assert_eq!(data["postId"], 11);
    assert_eq!(data["seen"], false);
    assert_eq!(data["fromUsername"], "alice");
    assert_eq!(data["fromAvatar"], "https://img/alice.png");
    assert_eq!(data["actor"]["username"], "alice");
}

#[tokio::test]
async fn test_every_recipient_connection_is_notified() {
    let app = TestEngine::start();
    let mut laptop = app.online(9).await;
    let mut phone = app.online(9).await;
    laptop.drain().await;

    app.engine.notifications.notify(like(9, 7)).await.unwrap();

    assert_eq!(laptop.collect_event("notification:new").await.len(), 1);
    assert_eq!(phone.collect_event("notification:new").await.len(), 1);
}

#[tokio::test]
async fn test_self_notification_is_suppressed() {
    let app = TestEngine::start();
    let mut alice = app.online(7).await;

    let outcome = app.engine.notifications.notify(like(7, 7)).await.unwrap();

    assert_eq!(outcome, NotifyOutcome::SelfSuppressed);
    assert!(app.notifications.all().await.is_empty());
    assert!(alice.collect().await.is_empty());
}

#[tokio::test]
async fn test_offline_recipient_is_persisted_only() {
    let app = TestEngine::start();
    let mut alice = app.online(7).await;

    let outcome = app.engine.notifications.notify(like(9, 7)).await.unwrap();

    assert!(matches!(
        outcome,
        NotifyOutcome::Stored {
            live_connections: 0,
            ..
        }
    ));
    let stored = app.notifications.all().await;
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].seen);
    assert!(!stored[0].dismissed);
    assert!(alice.collect().await.is_empty());
}

#[tokio::test]
async fn test_unknown_actor_falls_back_to_placeholder() {
    let app = TestEngine::start();
    let mut bob = app.online(9).await;

    app.engine.notifications.notify(like(9, 42)).await.unwrap();

    let frame = bob.recv_event("notification:new").await;
    assert_eq!(frame["data"]["fromUserId"], 42);
    assert_eq!(frame["data"]["actor"]["id"], 42);
}

#[tokio::test]
async fn test_chat_message_creates_notification_when_enabled() {
    let app = TestEngine::with_config(RealtimeConfig {
        notifications: NotificationRealtimeConfig {
            notify_on_message: true,
        },
        ..test_config()
    });
    app.notifications.upsert_actor(alice_profile());
    let mut alice = app.online(7).await;
    let mut bob = app.online(9).await;
    alice.drain().await;

    alice
        .send(serde_json::json!({
            "event": "send_message",
            "data": { "to": 9, "content": "new track for you", "type": "text" }
        }))
        .await;

    let frames = bob.collect().await;
    let names: Vec<_> = frames.iter().map(|f| f["event"].clone()).collect();
    assert_eq!(names, vec!["receive_message", "notification:new"]);
    assert_eq!(frames[1]["data"]["type"], "message");
    assert_eq!(frames[1]["data"]["content"], "new track for you");

    // The sender is never notified about their own message.
    assert!(alice.collect_event("notification:new").await.is_empty());
}

#[tokio::test]
async fn test_store_failure_pushes_nothing() {
    let app = TestEngine::with_notification_store(Arc::new(FailingNotificationStore));
    let mut bob = app.online(9).await;

    let err = app
        .engine
        .notifications
        .notify(like(9, 7))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Database);
    assert!(bob.collect_event("notification:new").await.is_empty());
    assert_eq!(app.engine.metrics.snapshot().notifications_pushed, 0);
}
