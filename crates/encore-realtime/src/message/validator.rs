//! Inbound frame and message validation rules.

use encore_core::error::AppError;
use encore_core::types::id::UserId;
use encore_entity::message::NewMessage;

use super::types::SendMessagePayload;

/// Validates a raw inbound frame before parsing.
pub fn validate_frame(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Frame exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty frame"));
    }

    Ok(())
}

/// Turns a `send_message` payload into an insertable message.
///
/// The sender comes from the authenticated connection. A message needs a
/// recipient and at least one non-blank body (text or file).
pub fn validate_send(sender: UserId, payload: SendMessagePayload) -> Result<NewMessage, AppError> {
    let receiver = payload
        .to
        .ok_or_else(|| AppError::validation("Missing recipient"))?;

    let content = payload.content.filter(|c| !c.trim().is_empty());
    let file_url = payload.file_url.filter(|u| !u.trim().is_empty());
    if content.is_none() && file_url.is_none() {
        return Err(AppError::validation("Message has neither content nor file"));
    }

    Ok(NewMessage {
        sender_id: sender,
        receiver_id: receiver,
        content,
        file_url,
        kind: payload.kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_entity::message::MessageKind;

    fn payload(to: Option<i64>, content: Option<&str>, file: Option<&str>) -> SendMessagePayload {
        SendMessagePayload {
            to: to.map(UserId),
            content: content.map(str::to_string),
            file_url: file.map(str::to_string),
            kind: MessageKind::Text,
        }
    }

    #[test]
    fn test_frame_limits() {
        assert!(validate_frame("{}", 16).is_ok());
        assert!(validate_frame("   ", 16).is_err());
        assert!(validate_frame(&"x".repeat(17), 16).is_err());
    }

    #[test]
    fn test_sender_is_authenticated_user() {
        let msg = validate_send(UserId(7), payload(Some(9), Some("hi"), None)).unwrap();
        assert_eq!(msg.sender_id, UserId(7));
        assert_eq!(msg.receiver_id, UserId(9));
    }

    #[test]
    fn test_missing_recipient_rejected() {
        assert!(validate_send(UserId(7), payload(None, Some("hi"), None)).is_err());
    }

    #[test]
    fn test_blank_body_rejected() {
        assert!(validate_send(UserId(7), payload(Some(9), Some("  "), None)).is_err());
        assert!(validate_send(UserId(7), payload(Some(9), None, Some(""))).is_err());
    }

    #[test]
    fn test_file_only_accepted() {
        let msg = validate_send(UserId(7), payload(Some(9), None, Some("/uploads/a.png"))).unwrap();
        assert_eq!(msg.content, None);
        assert_eq!(msg.file_url.as_deref(), Some("/uploads/a.png"));
    }
}
