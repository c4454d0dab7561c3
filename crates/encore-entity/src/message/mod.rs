//! Chat message entities.

pub mod kind;
pub mod model;

pub use kind::MessageKind;
pub use model::{Message, NewMessage};
