//! Route definitions for the Encore HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket upgrade lives at `/ws`.

use axum::Router;
use axum::routing::{get, patch, post};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with every route.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(message_routes())
        .merge(notification_routes())
        .merge(presence_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .with_state(state)
}

/// Direct message history, REST send, and read receipts
fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/messages/{user_id}",
            get(handlers::message::conversation).post(handlers::message::send_message),
        )
        .route(
            "/messages/{user_id}/read",
            patch(handlers::message::mark_read),
        )
}

/// Notification list, seen flag, and dismissal
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/dismiss-all",
            post(handlers::notification::dismiss_all),
        )
        .route(
            "/notifications/{id}/seen",
            post(handlers::notification::mark_seen),
        )
        .route(
            "/notifications/{id}/dismiss",
            post(handlers::notification::dismiss),
        )
}

/// Presence polling fallback
fn presence_routes() -> Router<AppState> {
    Router::new().route("/presence/online", get(handlers::presence::online_users))
}

/// Health check (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health_check))
}
