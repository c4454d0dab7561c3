//! JSON serialization for WebSocket frames.

use encore_core::error::AppError;

use super::types::{InboundEvent, OutboundEvent};

/// Serialize an outbound event to a text frame.
pub fn serialize_outbound(event: &OutboundEvent) -> Result<String, AppError> {
    Ok(serde_json::to_string(event)?)
}

/// Deserialize an inbound text frame.
pub fn deserialize_inbound(text: &str) -> Result<InboundEvent, AppError> {
    serde_json::from_str(text).map_err(|e| AppError::validation(format!("Malformed frame: {e}")))
}
