//! Message normalization.
//!
//! Turns a raw message plus its chat into the flat exported record.

use crate::domain::{AppError, ChatIdentity, MessageType, NormalizedRecord, RawMessage, Result};

use super::classifier::classify_sender;

/// Timestamp layout of the `date` field.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Normalizes one message.
///
/// `Ok(None)` means the message is excluded by policy (nameless person).
///
/// # Errors
/// Returns a per-record error (`UnknownSender` or `Serialization`); callers
/// are expected to skip the message and continue.
pub fn normalize_message(
    message: &RawMessage,
    chat: &ChatIdentity,
) -> Result<Option<NormalizedRecord>> {
    let sender = message.sender.as_ref().ok_or_else(|| AppError::UnknownSender {
        kind: "none".into(),
    })?;

    let Some(info) = classify_sender(sender)? else {
        return Ok(None);
    };

    let message_type = if message.voice {
        MessageType::Voice
    } else {
        MessageType::Text
    };

    let record = NormalizedRecord {
        message_id: message.id,
        chat_name: chat.display_name.clone(),
        chat_id: chat.id,
        date: message.date.format(DATE_FORMAT).to_string(),
        message_type,
        sender_type: info.sender_type,
        sender_name: info.sender_name,
        sender_username: info.sender_username,
        sender_id: message.sender_id.or(info.sender_id),
        message: message.text.clone().unwrap_or_default(),
        views: message.views,
        reply_to_msg_id: message.reply_to_msg_id,
    };

    // Every current field serializes infallibly; this only rejects a record
    // once a field with a fallible `Serialize` impl is added.
    serde_json::to_value(&record).map_err(AppError::serialization)?;

    Ok(Some(record))
}
