//! Sender classification.
//!
//! Maps the service's sender entities onto `(sender_type, sender_name)`.

use crate::domain::{AppError, RawSender, Result, SenderInfo, SenderType};

/// Classifies a sender entity.
///
/// Returns `Ok(None)` for a person with neither first nor last name: such
/// messages are left out of the export.
///
/// # Errors
/// Returns `AppError::UnknownSender` for any shape other than a person or a
/// broadcast channel.
pub fn classify_sender(sender: &RawSender) -> Result<Option<SenderInfo>> {
    match sender {
        RawSender::Person {
            id,
            first_name,
            last_name,
            username,
        } => Ok(person_name(first_name.as_deref(), last_name.as_deref()).map(|name| {
            SenderInfo {
                sender_type: SenderType::User,
                sender_name: name,
                sender_username: username.clone(),
                sender_id: *id,
            }
        })),
        RawSender::BroadcastChannel { id, title, username } => Ok(Some(SenderInfo {
            sender_type: SenderType::Channel,
            sender_name: title.clone(),
            sender_username: username.clone(),
            sender_id: *id,
        })),
        RawSender::Unknown { kind } => Err(AppError::UnknownSender { kind: kind.clone() }),
    }
}

/// Display name of a person; empty parts count as absent.
fn person_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let first = first.filter(|s| !s.is_empty());
    let last = last.filter(|s| !s.is_empty());

    match (first, last) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        (Some(name), None) | (None, Some(name)) => Some(name.to_string()),
        (None, None) => None,
    }
}
