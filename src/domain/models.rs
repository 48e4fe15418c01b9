//! Domain models for chat history export.
//!
//! Raw types mirror what the messaging service hands back; normalized types
//! are what ends up in the export document.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Resolved reference to a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatIdentity {
    /// Service-side chat identifier.
    pub id: i64,
    /// Name as shown in the account's dialog list.
    pub display_name: String,
}

/// Dialog entry as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub id: i64,
    pub name: String,
}

impl From<Dialog> for ChatIdentity {
    fn from(dialog: Dialog) -> Self {
        Self {
            id: dialog.id,
            display_name: dialog.name,
        }
    }
}

/// Application credentials for the messaging service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_id: i32,
    pub api_hash: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .finish()
    }
}

/// Authenticated account, returned when a session is established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

/// Sender entity attached to a raw message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSender {
    /// An individual user account.
    Person {
        id: Option<i64>,
        first_name: Option<String>,
        last_name: Option<String>,
        username: Option<String>,
    },
    /// A broadcast channel posting under its own name.
    BroadcastChannel {
        id: Option<i64>,
        title: String,
        username: Option<String>,
    },
    /// Any other shape; `kind` is the service's type tag.
    Unknown { kind: String },
}

/// Message as received from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub id: i64,
    /// Timestamp in the offset the service reported it in.
    pub date: DateTime<FixedOffset>,
    pub sender: Option<RawSender>,
    pub sender_id: Option<i64>,
    /// Body text; absent for pure media.
    pub text: Option<String>,
    /// Set for voice notes.
    pub voice: bool,
    pub views: Option<i64>,
    pub reply_to_msg_id: Option<i64>,
}

/// Kind of sender in a normalized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    User,
    Channel,
}

/// Kind of message in a normalized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Voice,
}

/// Normalized sender details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderInfo {
    pub sender_type: SenderType,
    pub sender_name: String,
    pub sender_username: Option<String>,
    pub sender_id: Option<i64>,
}

/// One exported message.
///
/// Optional fields serialize as `null` so every record carries every key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRecord {
    pub message_id: i64,
    pub chat_name: String,
    pub chat_id: i64,
    pub date: String,
    pub message_type: MessageType,
    pub sender_type: SenderType,
    pub sender_name: String,
    pub sender_username: Option<String>,
    pub sender_id: Option<i64>,
    pub message: String,
    pub views: Option<i64>,
    pub reply_to_msg_id: Option<i64>,
}

/// Ordered collection of records written as the run's only artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExportDocument {
    pub records: Vec<NormalizedRecord>,
}

impl ExportDocument {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Counters collected during a single export run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Messages returned by the fetcher.
    pub fetched: usize,
    /// Messages dropped because more than `limit` came back.
    pub truncated: usize,
    /// Records in the final document.
    pub exported: usize,
    /// Person senders with neither first nor last name.
    pub excluded_nameless: usize,
    /// Senders of an unrecognized shape.
    pub excluded_unknown_sender: usize,
    /// Records that failed to serialize.
    pub excluded_unserializable: usize,
}

impl ExportStats {
    /// Total number of records dropped during normalization.
    #[must_use]
    pub const fn excluded(&self) -> usize {
        self.excluded_nameless + self.excluded_unknown_sender + self.excluded_unserializable
    }
}
