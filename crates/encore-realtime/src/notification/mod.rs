//! Notification fan-out.

pub mod dispatcher;

pub use dispatcher::{NotificationDispatcher, NotifyOutcome};
