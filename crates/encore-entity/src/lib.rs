//! # encore-entity
//!
//! Domain entity models for Encore's messaging and notification core.
//! Every struct in this crate represents a database row or a domain value
//! object. Wire names are camelCase so a row serializes exactly as the
//! web client expects it, whether it arrives over REST or the socket.

pub mod message;
pub mod notification;
pub mod user;
