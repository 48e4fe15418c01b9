//! Export pipeline.
//!
//! Resolving → Fetching → Normalizing; the caller writes the document.
//! Failures before normalization abort the run, per-record failures do not.

use crate::domain::{
    AppConfig, AppError, ChatIdentity, ExportDocument, ExportStats, RawMessage, Result,
};
use crate::infrastructure::{MessagingClient, Session};

use super::fetcher::{FetchOptions, HistoryFetcher};
use super::normalizer::normalize_message;
use super::resolver::{ChatResolver, SelectionStrategy};

/// Stage of an export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    Fetching,
    Normalizing,
    Writing,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolving => write!(f, "resolving"),
            Self::Fetching => write!(f, "fetching"),
            Self::Normalizing => write!(f, "normalizing"),
            Self::Writing => write!(f, "writing"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub chat: ChatIdentity,
    pub document: ExportDocument,
    pub stats: ExportStats,
}

/// Orchestrates resolution, retrieval and normalization.
#[derive(Debug, Clone)]
pub struct ExportPipeline {
    resolver: ChatResolver,
    fetcher: HistoryFetcher,
}

impl ExportPipeline {
    #[must_use]
    pub const fn new(resolver: ChatResolver, fetcher: HistoryFetcher) -> Self {
        Self { resolver, fetcher }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            ChatResolver::new(config.resolve.case_sensitive, config.resolve.preview_chars),
            HistoryFetcher::new(config.fetch.page_size),
        )
    }

    /// Runs the export for the chat matching `query`.
    ///
    /// # Errors
    /// Returns error if the chat cannot be resolved or the history cannot be
    /// fetched.
    pub async fn run<C, S>(
        &self,
        session: &Session<C>,
        query: &str,
        options: &FetchOptions,
        selector: &S,
    ) -> Result<ExportReport>
    where
        C: MessagingClient,
        S: SelectionStrategy + ?Sized,
    {
        tracing::debug!(stage = %Stage::Resolving, "Resolving '{}'", query);
        let chat = self.resolver.resolve(session, query, selector).await?;
        tracing::info!("Selected chat: {}, id: {}", chat.display_name, chat.id);

        tracing::debug!(stage = %Stage::Fetching);
        let history = self.fetcher.fetch(session, &chat, options).await?;

        tracing::debug!(stage = %Stage::Normalizing);
        let (document, stats) = assemble(&chat, history, options.limit)?;
        tracing::info!("Finished fetching {} messages.", document.len());

        Ok(ExportReport {
            chat,
            document,
            stats,
        })
    }
}

/// Sorts, truncates and normalizes fetched messages into a document.
///
/// Messages are ordered by date, then id, so identical input always yields
/// an identical document. Per-record failures are logged and counted.
///
/// # Errors
/// Returns any error that is not scoped to a single record.
pub fn assemble(
    chat: &ChatIdentity,
    mut history: Vec<RawMessage>,
    limit: usize,
) -> Result<(ExportDocument, ExportStats)> {
    let mut stats = ExportStats {
        fetched: history.len(),
        ..Default::default()
    };

    history.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    if history.len() > limit {
        stats.truncated = history.len() - limit;
        history.truncate(limit);
    }

    let mut records = Vec::with_capacity(history.len());
    for message in &history {
        match normalize_message(message, chat) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {
                stats.excluded_nameless += 1;
                tracing::warn!(
                    message_id = message.id,
                    "Sender has no name, excluding message"
                );
            }
            Err(err) if !err.is_per_record() => return Err(err),
            Err(err @ AppError::UnknownSender { .. }) => {
                stats.excluded_unknown_sender += 1;
                tracing::warn!(message_id = message.id, "{}, excluding message", err);
            }
            Err(err) => {
                stats.excluded_unserializable += 1;
                tracing::warn!(
                    message_id = message.id,
                    "{}\nFailed to format message as JSON. Excluding message.",
                    err
                );
            }
        }
    }

    stats.exported = records.len();
    Ok((ExportDocument { records }, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{format_document_json, FixedSelector};
    use crate::domain::{Credentials, MessageType, RawSender, SenderType};
    use crate::infrastructure::memory_client::{channel, message, person, MemoryClient};

    fn chat() -> ChatIdentity {
        ChatIdentity {
            id: -100,
            display_name: "NewsCo".into(),
        }
    }

    fn options(limit: usize, date: &str) -> FetchOptions {
        FetchOptions {
            limit,
            offset_date: date.parse().unwrap(),
            min_id: None,
            max_id: None,
        }
    }

    async fn session(client: MemoryClient) -> Session<MemoryClient> {
        let creds = Credentials {
            api_id: 1,
            api_hash: "h".into(),
        };
        Session::open(client, &creds, None).await.unwrap()
    }

    #[tokio::test]
    async fn test_channel_export_example() {
        let client = MemoryClient::new()
            .with_dialog(-100, "NewsCo")
            .with_dialog(5, "Family")
            .with_messages(
                -100,
                vec![
                    message(1, "2020-12-31T10:00:00Z", channel(-100, "NewsCo")),
                    message(2, "2021-01-02T10:00:00Z", channel(-100, "NewsCo")),
                    message(3, "2021-01-03T10:00:00Z", channel(-100, "NewsCo")),
                ],
            );
        let session = session(client).await;
        let pipeline = ExportPipeline::from_config(&AppConfig::default());

        let report = pipeline
            .run(&session, "News", &options(2, "2021-01-01"), &FixedSelector(1))
            .await
            .unwrap();

        let records = &report.document.records;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, "2021-01-02 10:00:00");
        assert_eq!(records[1].date, "2021-01-03 10:00:00");
        assert!(records.iter().all(|r| r.sender_type == SenderType::Channel));
        assert!(records.iter().all(|r| r.sender_name == "NewsCo"));
        assert_eq!(report.chat, chat());
    }

    #[tokio::test]
    async fn test_run_fails_when_chat_missing() {
        let session = session(MemoryClient::new().with_dialog(1, "Family")).await;
        let pipeline = ExportPipeline::from_config(&AppConfig::default());

        let result = pipeline
            .run(&session, "News", &options(10, "1970-01-01"), &FixedSelector(1))
            .await;

        assert!(matches!(result, Err(AppError::ChatNotFound { .. })));
    }

    #[tokio::test]
    async fn test_run_fails_on_transport_error() {
        let client = MemoryClient::new()
            .with_dialog(-100, "NewsCo")
            .failing_history();
        let session = session(client).await;
        let pipeline = ExportPipeline::from_config(&AppConfig::default());

        let result = pipeline
            .run(&session, "News", &options(10, "1970-01-01"), &FixedSelector(1))
            .await;

        assert!(matches!(result, Err(AppError::Transport { .. })));
    }

    #[test]
    fn test_assemble_sorts_regardless_of_input_order() {
        let history = vec![
            message(3, "2021-01-03T00:00:00Z", channel(-100, "NewsCo")),
            message(1, "2021-01-01T00:00:00Z", channel(-100, "NewsCo")),
            message(2, "2021-01-02T00:00:00Z", channel(-100, "NewsCo")),
        ];

        let (document, _) = assemble(&chat(), history, 10).unwrap();

        let ids: Vec<i64> = document.records.iter().map(|r| r.message_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_assemble_breaks_date_ties_by_id() {
        let history = vec![
            message(9, "2021-01-01T00:00:00Z", channel(-100, "NewsCo")),
            message(4, "2021-01-01T00:00:00Z", channel(-100, "NewsCo")),
        ];

        let (document, _) = assemble(&chat(), history, 10).unwrap();

        assert_eq!(document.records[0].message_id, 4);
        assert_eq!(document.records[1].message_id, 9);
    }

    #[test]
    fn test_assemble_sorts_across_offsets() {
        // 23:00 at +05:00 is 18:00 UTC, earlier than 20:00 UTC.
        let history = vec![
            message(1, "2021-01-01T20:00:00Z", channel(-100, "NewsCo")),
            message(2, "2021-01-01T23:00:00+05:00", channel(-100, "NewsCo")),
        ];

        let (document, _) = assemble(&chat(), history, 10).unwrap();

        assert_eq!(document.records[0].message_id, 2);
    }

    #[test]
    fn test_assemble_truncates_after_sort() {
        let history = vec![
            message(3, "2021-01-03T00:00:00Z", channel(-100, "NewsCo")),
            message(1, "2021-01-01T00:00:00Z", channel(-100, "NewsCo")),
            message(2, "2021-01-02T00:00:00Z", channel(-100, "NewsCo")),
        ];

        let (document, stats) = assemble(&chat(), history, 2).unwrap();

        let ids: Vec<i64> = document.records.iter().map(|r| r.message_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(stats.fetched, 3);
        assert_eq!(stats.truncated, 1);
        assert_eq!(stats.exported, 2);
    }

    #[test]
    fn test_assemble_skips_excluded_records() {
        let mut voice = message(4, "2021-01-04T00:00:00Z", person(7, Some("Ada"), None));
        voice.voice = true;
        let history = vec![
            message(1, "2021-01-01T00:00:00Z", person(5, None, None)),
            message(
                2,
                "2021-01-02T00:00:00Z",
                RawSender::Unknown {
                    kind: "ChatForbidden".into(),
                },
            ),
            message(3, "2021-01-03T00:00:00Z", channel(-100, "NewsCo")),
            voice,
        ];

        let (document, stats) = assemble(&chat(), history, 10).unwrap();

        let ids: Vec<i64> = document.records.iter().map(|r| r.message_id).collect();
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(document.records[0].message_type, MessageType::Text);
        assert_eq!(document.records[1].message_type, MessageType::Voice);
        assert_eq!(stats.excluded_nameless, 1);
        assert_eq!(stats.excluded_unknown_sender, 1);
        assert_eq!(stats.exported, 2);
    }

    #[test]
    fn test_assemble_passes_through_ids_and_counters() {
        let mut raw = message(42, "2021-01-01T00:00:00Z", channel(-100, "NewsCo"));
        raw.views = Some(980);
        raw.reply_to_msg_id = Some(41);

        let (document, _) = assemble(&chat(), vec![raw], 10).unwrap();

        let record = &document.records[0];
        assert_eq!(record.message_id, 42);
        assert_eq!(record.views, Some(980));
        assert_eq!(record.reply_to_msg_id, Some(41));
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let history = || {
            vec![
                message(2, "2021-01-01T00:00:00Z", channel(-100, "NewsCo")),
                message(1, "2021-01-01T00:00:00Z", person(3, Some("Ada"), Some("L"))),
            ]
        };
        let mut reversed = history();
        reversed.reverse();

        let (first, _) = assemble(&chat(), history(), 10).unwrap();
        let (second, _) = assemble(&chat(), reversed, 10).unwrap();

        assert_eq!(
            format_document_json(&first).unwrap(),
            format_document_json(&second).unwrap()
        );
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Resolving.to_string(), "resolving");
        assert_eq!(Stage::Done.to_string(), "done");
    }
}
