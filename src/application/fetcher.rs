//! History retrieval.
//!
//! Pages through a chat's history oldest-first, starting at the offset date.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::domain::{ChatIdentity, RawMessage, Result};
use crate::infrastructure::{HistoryQuery, MessagingClient, Session};

/// Bounds for a history fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Maximum number of messages to return.
    pub limit: usize,
    /// Messages dated before midnight UTC of this day are skipped.
    pub offset_date: NaiveDate,
    /// Only messages with a greater id.
    pub min_id: Option<i64>,
    /// Only messages with a smaller id.
    pub max_id: Option<i64>,
}

impl FetchOptions {
    /// The offset date as an instant.
    #[must_use]
    pub fn since(&self) -> DateTime<Utc> {
        self.offset_date.and_time(NaiveTime::MIN).and_utc()
    }
}

/// Retrieves raw history for a resolved chat.
#[derive(Debug, Clone)]
pub struct HistoryFetcher {
    page_size: usize,
}

impl HistoryFetcher {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    /// Fetches up to `options.limit` messages, oldest first.
    ///
    /// # Errors
    /// Returns `AppError::Transport` if any page request fails.
    pub async fn fetch<C: MessagingClient>(
        &self,
        session: &Session<C>,
        chat: &ChatIdentity,
        options: &FetchOptions,
    ) -> Result<Vec<RawMessage>> {
        let since = options.since();
        tracing::info!("Fetching history of {} from {}", chat.display_name, since);

        let mut messages: Vec<RawMessage> = Vec::new();
        let mut after_id: Option<i64> = None;

        while messages.len() < options.limit {
            let wanted = self.page_size.min(options.limit - messages.len());
            let query = HistoryQuery {
                limit: wanted,
                reverse: true,
                offset_date: Some(since),
                after_id,
                min_id: options.min_id,
                max_id: options.max_id,
            };

            let page = session.client().get_messages(chat.id, &query).await?;
            let received = page.len();
            tracing::debug!(chat_id = chat.id, ?after_id, received, "Fetched page");

            let last_id = page.iter().map(|m| m.id).max();
            messages.extend(page.into_iter().filter(|m| m.date >= since));

            if received < wanted {
                break;
            }
            // A page that does not advance past the previous cursor would loop forever.
            match (last_id, after_id) {
                (Some(last), Some(prev)) if last <= prev => break,
                (None, _) => break,
                _ => after_id = last_id,
            }
        }

        messages.truncate(options.limit);
        tracing::info!("Fetched {} messages", messages.len());
        Ok(messages)
    }
}
