//! Chat name resolution.
//!
//! Finds the single dialog whose name contains the query, asking a
//! `SelectionStrategy` to break ties.

use std::io::{BufRead, Write};

use crate::domain::{AppError, ChatIdentity, RawMessage, Result};
use crate::infrastructure::{HistoryQuery, MessagingClient, Session};

use super::formatter::format_candidates_table;

/// Preview shown for a chat without messages.
const NO_MESSAGES: &str = "No messages";

/// A chat offered during disambiguation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// 1-based position in the list.
    pub ordinal: usize,
    pub chat: ChatIdentity,
    /// Start of the chat's latest message.
    pub preview: String,
}

/// Picks one of several matching chats.
pub trait SelectionStrategy {
    /// Returns the 1-based ordinal of the chosen candidate.
    ///
    /// # Errors
    /// Returns error if no choice can be obtained.
    fn select(&self, candidates: &[Candidate]) -> Result<usize>;
}

/// Prints the candidates and reads the choice from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSelector;

impl SelectionStrategy for ConsoleSelector {
    fn select(&self, candidates: &[Candidate]) -> Result<usize> {
        println!("More than one chat found. Please choose the chat to retrieve:");
        println!("{}", format_candidates_table(candidates));
        print!("\nEnter the number of the chat: ");
        std::io::stdout()
            .flush()
            .map_err(|e| AppError::io("Failed to flush stdout", e))?;

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| AppError::io("Failed to read selection", e))?;

        parse_choice(&line)
    }
}

/// Always returns the same ordinal.
#[derive(Debug, Clone, Copy)]
pub struct FixedSelector(pub usize);

impl SelectionStrategy for FixedSelector {
    fn select(&self, _candidates: &[Candidate]) -> Result<usize> {
        Ok(self.0)
    }
}

/// Parses a typed ordinal.
fn parse_choice(input: &str) -> Result<usize> {
    let input = input.trim();
    input.parse().map_err(|_| AppError::InvalidSelection {
        message: format!("'{input}' is not a number"),
    })
}

/// Resolves a name query to a single chat.
#[derive(Debug, Clone)]
pub struct ChatResolver {
    case_sensitive: bool,
    preview_chars: usize,
}

impl ChatResolver {
    #[must_use]
    pub const fn new(case_sensitive: bool, preview_chars: usize) -> Self {
        Self {
            case_sensitive,
            preview_chars,
        }
    }

    /// Resolves `query` against the session's dialogs.
    ///
    /// # Errors
    /// - `ChatNotFound` if no dialog matches
    /// - `InvalidSelection` if the selector picks an ordinal out of range
    /// - `Transport` if listing dialogs or loading previews fails
    pub async fn resolve<C, S>(
        &self,
        session: &Session<C>,
        query: &str,
        selector: &S,
    ) -> Result<ChatIdentity>
    where
        C: MessagingClient,
        S: SelectionStrategy + ?Sized,
    {
        if query.is_empty() {
            return Err(AppError::Config {
                message: "Chat name query must not be empty".into(),
            });
        }

        let dialogs = session.client().list_dialogs().await?;
        tracing::debug!("Matching '{}' against {} dialogs", query, dialogs.len());

        let mut found: Vec<ChatIdentity> = dialogs
            .into_iter()
            .filter(|d| self.matches(&d.name, query))
            .map(ChatIdentity::from)
            .collect();

        match found.len() {
            0 => Err(AppError::ChatNotFound {
                query: query.to_string(),
            }),
            1 => Ok(found.remove(0)),
            count => {
                tracing::info!("{} chats match '{}'", count, query);

                let mut candidates = Vec::with_capacity(count);
                for (i, chat) in found.into_iter().enumerate() {
                    let latest = session
                        .client()
                        .get_messages(chat.id, &HistoryQuery::latest(1))
                        .await?;
                    candidates.push(Candidate {
                        ordinal: i + 1,
                        preview: preview_text(latest.first(), self.preview_chars),
                        chat,
                    });
                }

                let choice = selector.select(&candidates)?;
                if choice == 0 || choice > candidates.len() {
                    return Err(AppError::InvalidSelection {
                        message: format!(
                            "Number {} is out of range (1-{})",
                            choice,
                            candidates.len()
                        ),
                    });
                }
                Ok(candidates.swap_remove(choice - 1).chat)
            }
        }
    }

    fn matches(&self, name: &str, query: &str) -> bool {
        if self.case_sensitive {
            name.contains(query)
        } else {
            name.to_lowercase().contains(&query.to_lowercase())
        }
    }
}

/// Short single-line preview of a message.
#[must_use]
pub fn preview_text(message: Option<&RawMessage>, max_chars: usize) -> String {
    match message {
        Some(message) => {
            let text = message.text.as_deref().unwrap_or_default();
            text.chars()
                .take(max_chars)
                .collect::<String>()
                .replace('\n', " ")
                .trim()
                .to_string()
        }
        None => NO_MESSAGES.to_string(),
    }
}
