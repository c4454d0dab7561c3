//! End-to-end WebSocket tests over a real TCP listener.

mod common;

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use common::{TestApp, token_for};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Serves the app on an ephemeral port and returns its address.
async fn serve(app: &TestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("local addr");
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server");
    });
    addr.to_string()
}

async fn connect(addr: &str, user: i64, name: &str) -> Client {
    let url = format!("ws://{addr}/ws?token={}", token_for(user, name));
    let (client, _) = connect_async(url).await.expect("WebSocket handshake");
    client
}

async fn send(client: &mut Client, frame: Value) {
    client
        .send(Message::Text(frame.to_string().into()))
        .await
        .expect("send frame");
}

/// Reads frames until one named `event` arrives.
async fn recv_event(client: &mut Client, event: &str) -> Value {
    let wait = async {
        loop {
            match client.next().await {
                Some(Ok(Message::Text(text))) => {
                    let frame: Value = serde_json::from_str(text.as_str()).expect("JSON frame");
                    if frame["event"] == event {
                        return frame;
                    }
                }
                Some(Ok(_)) => {}
                other => panic!("connection ended while waiting for {event}: {other:?}"),
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {event}"))
}

#[tokio::test]
async fn test_handshake_rejects_bad_token() {
    let app = TestApp::new();
    let addr = serve(&app).await;

    let result = connect_async(format!("ws://{addr}/ws?token=forged")).await;

    match result {
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), http::StatusCode::UNAUTHORIZED);
        }
        Err(e) => panic!("expected 401, got {e}"),
        Ok(_) => panic!("expected 401, handshake succeeded"),
    }
    assert_eq!(app.engine.connections.connection_count(), 0);
}

#[tokio::test]
async fn test_bearer_header_handshake() {
    let app = TestApp::new();
    let addr = serve(&app).await;

    let mut request = format!("ws://{addr}/ws").into_client_request().unwrap();
    request.headers_mut().insert(
        http::header::AUTHORIZATION,
        format!("Bearer {}", token_for(9, "bob")).parse().unwrap(),
    );
    let (mut bob, _) = connect_async(request).await.expect("handshake");

    let snapshot = recv_event(&mut bob, "presence:snapshot").await;
    assert_eq!(snapshot["data"], json!([]));
}

#[tokio::test]
async fn test_chat_round_trip_over_websocket() {
    let app = TestApp::new();
    let addr = serve(&app).await;

    let mut alice = connect(&addr, 7, "alice").await;
    recv_event(&mut alice, "presence:snapshot").await;
    send(&mut alice, json!({ "event": "register", "data": 7 })).await;
    recv_event(&mut alice, "presence:update").await;

    let mut bob = connect(&addr, 9, "bob").await;
    let snapshot = recv_event(&mut bob, "presence:snapshot").await;
    assert_eq!(snapshot["data"], json!([7]));
    send(&mut bob, json!({ "event": "register", "data": 9 })).await;

    let update = recv_event(&mut alice, "presence:update").await;
    assert_eq!(update["data"], json!({ "userId": 9, "online": true }));

    send(
        &mut alice,
        json!({ "event": "send_message", "data": { "to": 9, "content": "hi bob", "type": "text" } }),
    )
    .await;

    let received = recv_event(&mut bob, "receive_message").await;
    assert_eq!(received["data"]["senderId"], 7);
    assert_eq!(received["data"]["content"], "hi bob");
    let echo = recv_event(&mut alice, "receive_message").await;
    assert_eq!(echo["data"]["id"], received["data"]["id"]);

    send(&mut bob, json!({ "event": "read_messages", "data": { "from": 7 } })).await;
    let receipt = recv_event(&mut alice, "messages_read").await;
    assert_eq!(receipt["data"], json!({ "by": 9 }));

    bob.close(None).await.expect("close");
    let offline = recv_event(&mut alice, "presence:update").await;
    assert_eq!(offline["data"], json!({ "userId": 9, "online": false }));
    assert!(app.messages.all().await[0].read);
}

#[tokio::test]
async fn test_oversized_frame_closes_connection() {
    let app = TestApp::with_config(|config| config.realtime.max_frame_bytes = 1024);
    let addr = serve(&app).await;

    let mut alice = connect(&addr, 7, "alice").await;
    recv_event(&mut alice, "presence:snapshot").await;
    assert_eq!(app.engine.connections.connection_count(), 1);

    let huge = "x".repeat(4096);
    let _ = alice.send(Message::Text(huge.into())).await;

    let closed = async {
        loop {
            match alice.next().await {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), closed)
        .await
        .expect("server kept the connection open");

    let released = async {
        while app.engine.connections.connection_count() > 0 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(5), released)
        .await
        .expect("connection not released");
    assert!(app.messages.all().await.is_empty());
}
