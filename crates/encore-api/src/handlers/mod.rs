//! Request handlers.

pub mod health;
pub mod message;
pub mod notification;
pub mod presence;
pub mod ws;
