//! Integration tests for presence tracking and broadcasts.

mod common;

use serde_json::json;

use common::TestEngine;

#[tokio::test]
async fn test_new_connection_receives_snapshot() {
    let app = TestEngine::start();
    let _alice = app.online(7).await;

    let mut bob = app.connect(9);
    let frame = bob.recv().await;

    assert_eq!(frame, json!({ "event": "presence:snapshot", "data": [7] }));
}

#[tokio::test]
async fn test_unregistered_connection_is_not_online() {
    let app = TestEngine::start();
    let mut bob = app.connect(9);
    bob.drain().await;

    assert!(app.online_users().is_empty());
    assert_eq!(app.engine.connections.connection_count(), 1);
}

#[tokio::test]
async fn test_register_broadcasts_update_then_snapshot() {
    let app = TestEngine::start();
    let mut alice = app.online(7).await;

    let bob = app.connect(9);
    bob.send(json!({ "event": "register", "data": 9 })).await;

    let frames = alice.collect().await;
    assert_eq!(
        frames,
        vec![
            json!({ "event": "presence:update", "data": { "userId": 9, "online": true } }),
            json!({ "event": "presence:snapshot", "data": [7, 9] }),
        ]
    );
}

#[tokio::test]
async fn test_register_without_id_uses_authenticated_user() {
    let app = TestEngine::start();
    let bob = app.connect(9);
    bob.send(json!({ "event": "register", "data": null })).await;

    assert_eq!(app.online_users(), vec![9]);
}

#[tokio::test]
async fn test_register_for_other_user_is_ignored() {
    let app = TestEngine::start();
    let mut observer = app.online(1).await;

    let bob = app.connect(9);
    bob.send(json!({ "event": "register", "data": 7 })).await;

    assert_eq!(app.online_users(), vec![1]);
    assert!(observer.collect().await.is_empty());
}

#[tokio::test]
async fn test_second_connection_does_not_rebroadcast_online() {
    let app = TestEngine::start();
    let mut alice = app.online(7).await;
    let _bob_laptop = app.online(9).await;
    alice.drain().await;

    let _bob_phone = app.online(9).await;

    assert!(alice.collect_event("presence:update").await.is_empty());
    assert_eq!(app.online_users(), vec![7, 9]);
}

#[tokio::test]
async fn test_offline_only_after_last_connection_closes() {
    let app = TestEngine::start();
    let mut alice = app.online(7).await;
    let bob_laptop = app.online(9).await;
    let bob_phone = app.online(9).await;
    alice.drain().await;

    drop(bob_laptop);
    assert!(alice.collect().await.is_empty());
    assert_eq!(app.online_users(), vec![7, 9]);

    drop(bob_phone);
    let frames = alice.collect().await;
    assert_eq!(
        frames,
        vec![
            json!({ "event": "presence:update", "data": { "userId": 9, "online": false } }),
            json!({ "event": "presence:snapshot", "data": [7] }),
        ]
    );
    assert_eq!(app.online_users(), vec![7]);
}

#[tokio::test]
async fn test_unregistered_disconnect_is_silent() {
    let app = TestEngine::start();
    let mut alice = app.online(7).await;

    let lurker = app.connect(9);
    drop(lurker);

    assert!(alice.collect().await.is_empty());
    assert_eq!(app.engine.connections.connection_count(), 1);
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let app = TestEngine::start();
    let mut bob = app.connect(9);
    bob.drain().await;

    bob.send_raw("not json").await;
    bob.send_raw(r#"{"event":"teleport","data":{}}"#).await;
    bob.send_raw(r#"{"event":"typing","data":{}}"#).await;
    assert!(bob.collect().await.is_empty());

    bob.send(json!({ "event": "register", "data": 9 })).await;
    assert_eq!(app.online_users(), vec![9]);

    let metrics = app.engine.metrics.snapshot();
    assert_eq!(metrics.events_rejected, 3);
    assert_eq!(metrics.events_received, 1);
}

#[tokio::test]
async fn test_shutdown_closes_connections() {
    let app = TestEngine::start();
    let alice = app.online(7).await;
    let handle = alice.guard.handle().clone();

    app.engine.shutdown().await;

    assert!(!handle.is_alive());
    assert_eq!(app.engine.connections.connection_count(), 0);
    assert!(app.online_users().is_empty());
}
