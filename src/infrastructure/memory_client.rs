//! In-memory `MessagingClient` used by tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::{Account, AppError, Credentials, Dialog, RawMessage, RawSender, Result};

use super::client::{HistoryQuery, MessagingClient};

#[derive(Debug, Default)]
struct State {
    dialogs: Vec<Dialog>,
    history: HashMap<i64, Vec<RawMessage>>,
    reject_auth: bool,
    fail_history: bool,
    queries: Vec<(i64, HistoryQuery)>,
    disconnected: bool,
}

/// Scriptable client holding dialogs and history in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryClient {
    state: Arc<Mutex<State>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_dialog(self, id: i64, name: &str) -> Self {
        self.state().dialogs.push(Dialog {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_messages(self, chat_id: i64, messages: Vec<RawMessage>) -> Self {
        self.state()
            .history
            .entry(chat_id)
            .or_default()
            .extend(messages);
        self
    }

    pub fn rejecting_auth(self) -> Self {
        self.state().reject_auth = true;
        self
    }

    pub fn failing_history(self) -> Self {
        self.state().fail_history = true;
        self
    }

    pub fn queries(&self) -> Vec<(i64, HistoryQuery)> {
        self.state().queries.clone()
    }

    pub fn is_disconnected(&self) -> bool {
        self.state().disconnected
    }
}

#[async_trait]
impl MessagingClient for MemoryClient {
    async fn authenticate(
        &self,
        _credentials: &Credentials,
        _stored_session: Option<&str>,
    ) -> Result<(Account, String)> {
        if self.state().reject_auth {
            return Err(AppError::Auth {
                message: "invalid api credentials".into(),
            });
        }
        let account = Account {
            id: 1,
            username: Some("exporter".into()),
            first_name: Some("Export".into()),
        };
        Ok((account, "memory-session".into()))
    }

    async fn list_dialogs(&self) -> Result<Vec<Dialog>> {
        Ok(self.state().dialogs.clone())
    }

    async fn get_messages(&self, chat_id: i64, query: &HistoryQuery) -> Result<Vec<RawMessage>> {
        let mut state = self.state();
        state.queries.push((chat_id, query.clone()));

        if state.fail_history {
            return Err(AppError::Transport {
                message: "connection reset".into(),
                source: None,
            });
        }

        let mut messages: Vec<RawMessage> = state
            .history
            .get(&chat_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|m| query.offset_date.map_or(true, |d| m.date >= d))
            .filter(|m| query.after_id.map_or(true, |id| m.id > id))
            .filter(|m| query.min_id.map_or(true, |id| m.id > id))
            .filter(|m| query.max_id.map_or(true, |id| m.id < id))
            .collect();

        messages.sort_by_key(|m| m.id);
        if !query.reverse {
            messages.reverse();
        }
        messages.truncate(query.limit);
        Ok(messages)
    }

    async fn disconnect(&self) -> Result<()> {
        self.state().disconnected = true;
        Ok(())
    }
}

/// Person sender fixture.
pub fn person(id: i64, first_name: Option<&str>, last_name: Option<&str>) -> RawSender {
    RawSender::Person {
        id: Some(id),
        first_name: first_name.map(str::to_string),
        last_name: last_name.map(str::to_string),
        username: None,
    }
}

/// Broadcast channel sender fixture.
pub fn channel(id: i64, title: &str) -> RawSender {
    RawSender::BroadcastChannel {
        id: Some(id),
        title: title.to_string(),
        username: None,
    }
}

/// Text message fixture; `date` is RFC 3339.
pub fn message(id: i64, date: &str, sender: RawSender) -> RawMessage {
    let sender_id = match &sender {
        RawSender::Person { id, .. }
        | RawSender::BroadcastChannel { id, .. } => *id,
        RawSender::Unknown { .. } => None,
    };
    RawMessage {
        id,
        date: chrono::DateTime::parse_from_rfc3339(date).unwrap(),
        sender: Some(sender),
        sender_id,
        text: Some(format!("message {id}")),
        voice: false,
        views: None,
        reply_to_msg_id: None,
    }
}
