//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use encore_api::{AppState, build_app};
use encore_auth::jwt::JwtVerifier;
use encore_auth::verifier::CredentialVerifier;
use encore_core::config::AppConfig;
use encore_realtime::RealtimeEngine;
use encore_realtime::store::{
    MemoryMessageStore, MemoryNotificationStore, MessageStore, NotificationStore,
};

/// HMAC secret shared by the app under test and the token minting helper.
pub const TEST_SECRET: &str = "integration-test-secret";

/// Mints a session token for `user`, valid for an hour.
pub fn token_for(user: i64, username: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "id": user,
        "username": username,
        "iat": now,
        "exp": now + 3600,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to sign test token")
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Engine behind the router
    pub engine: Arc<RealtimeEngine>,
    /// Backing message store
    pub messages: Arc<MemoryMessageStore>,
    /// Backing notification store
    pub notifications: Arc<MemoryNotificationStore>,
}

/// Response with a parsed JSON body (`Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    /// Create a new test application over in-memory stores
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test application, adjusting the config first
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = TEST_SECRET.to_string();
        config.realtime.presence_heartbeat_seconds = 3600;
        adjust(&mut config);

        let messages = Arc::new(MemoryMessageStore::new());
        let notifications = Arc::new(MemoryNotificationStore::new());
        let verifier: Arc<dyn CredentialVerifier> = Arc::new(JwtVerifier::new(&config.auth));

        let engine = Arc::new(RealtimeEngine::start(
            config.realtime.clone(),
            verifier.clone(),
            messages.clone() as Arc<dyn MessageStore>,
            notifications.clone() as Arc<dyn NotificationStore>,
        ));
        let state = AppState::new(
            config,
            engine.clone(),
            verifier,
            notifications.clone() as Arc<dyn NotificationStore>,
        );

        Self {
            router: build_app(state),
            engine,
            messages,
            notifications,
        }
    }

    /// Make a request, authenticating with `token` as a bearer credential
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(request).await
    }

    /// Send a fully built request through the router
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
