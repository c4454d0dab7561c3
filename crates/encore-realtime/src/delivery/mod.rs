//! Message routing to live connections.

pub mod fanout;
pub mod pipeline;

pub use fanout::LiveFanout;
pub use pipeline::{MessagePipeline, SendOutcome};
