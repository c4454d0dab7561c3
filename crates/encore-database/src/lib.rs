//! # encore-database
//!
//! PostgreSQL connection management and concrete repositories for the
//! message and notification tables.

pub mod connection;
pub mod repositories;

pub use connection::DatabasePool;
