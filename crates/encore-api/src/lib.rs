//! # encore-api
//!
//! HTTP API layer for Encore built on Axum.
//!
//! Provides the WebSocket upgrade, the REST endpoints for message history,
//! read receipts, notifications, and presence polling, plus extractors and
//! error mapping.

pub mod app;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
