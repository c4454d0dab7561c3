//! Repository implementations for messaging entities.

pub mod message;
pub mod notification;

pub use message::MessageRepository;
pub use notification::NotificationRepository;
