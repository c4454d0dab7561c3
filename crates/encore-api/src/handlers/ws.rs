//! WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use encore_auth::verifier::VerifiedIdentity;
use encore_realtime::connection::{ConnectionHandle, HandshakeCredentials};

use crate::error::ApiError;
use crate::extractors::auth::{bearer_token, session_cookie};
use crate::state::AppState;

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Default, serde::Deserialize)]
pub struct WsQuery {
    /// Explicit handshake token.
    pub token: Option<String>,
}

/// GET /ws: WebSocket upgrade
///
/// The credential is verified before the upgrade; a rejected handshake
/// gets `401` and never touches the registry.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let credentials = HandshakeCredentials {
        auth_token: query.token,
        bearer: bearer_token(&headers),
        cookie: session_cookie(&headers, &state.config.auth.cookie_name),
    };

    let identity = match state.realtime.authenticator.authenticate(&credentials).await {
        Ok(identity) => identity,
        Err(e) => {
            debug!(error = %e, "WebSocket handshake rejected");
            return ApiError(e).into_response();
        }
    };

    // Oversized frames are refused by the protocol layer before buffering.
    let max_frame_bytes = state.config.realtime.max_frame_bytes.max(1);
    match ws {
        Ok(ws) => ws
            .max_message_size(max_frame_bytes)
            .max_frame_size(max_frame_bytes)
            .on_upgrade(move |socket| handle_socket(state, identity, socket))
            .into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

/// Drives one accepted connection until either side closes.
async fn handle_socket(state: AppState, identity: VerifiedIdentity, socket: WebSocket) {
    let (guard, outbound_rx) = state.realtime.connections.accept(identity);
    let handle = guard.handle().clone();
    let (ws_tx, mut ws_rx) = socket.split();

    let writer = tokio::spawn(forward_outbound(handle.clone(), outbound_rx, ws_tx));

    loop {
        tokio::select! {
            _ = handle.closed() => break,
            incoming = ws_rx.next() => match incoming {
                Some(Ok(Message::Text(text))) => guard.handle_frame(text.as_str()).await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(conn_id = %handle.id, error = %e, "WebSocket read error");
                    break;
                }
            },
        }
    }

    // Unregisters and closes the handle, which stops the writer.
    drop(guard);
    let _ = writer.await;

    info!(
        conn_id = %handle.id,
        user_id = %handle.user_id,
        "WebSocket connection closed"
    );
}

/// Copies queued frames to the socket until the connection closes.
async fn forward_outbound(
    handle: Arc<ConnectionHandle>,
    mut outbound_rx: mpsc::Receiver<String>,
    mut ws_tx: SplitSink<WebSocket, Message>,
) {
    loop {
        tokio::select! {
            _ = handle.closed() => {
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }
            frame = outbound_rx.recv() => match frame {
                Some(frame) => {
                    if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                        handle.mark_dead();
                        break;
                    }
                }
                None => break,
            },
        }
    }
}
