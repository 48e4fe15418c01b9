//! CLI interface using clap.
//!
//! Provides the command-line arguments for the export.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::application::FetchOptions;
use crate::domain::{AppError, Credentials, Result};

/// Chat History Export - Save the message history of a chat or channel as JSON.
#[derive(Parser, Debug)]
#[command(name = "chat-history")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name (or part of the name) of the chat to export.
    #[arg(required = true, num_args = 1..)]
    pub chat_name: Vec<String>,

    /// Your API ID.
    #[arg(long, env = "TELEGRAM_API_ID", hide_env_values = true)]
    pub api_id: Option<i32>,

    /// Your API hash.
    #[arg(long, env = "TELEGRAM_API_HASH", hide_env_values = true)]
    pub api_hash: Option<String>,

    /// Output file (default: telegram_history-<chat name>.json).
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Maximum number of messages to retrieve.
    #[arg(long, default_value = "10000")]
    pub limit: usize,

    /// Date (YYYY-MM-DD) from which the history should be retrieved.
    #[arg(long, default_value = "1970-01-01")]
    pub offset_date: NaiveDate,

    /// Only retrieve messages with an ID greater than this.
    #[arg(long)]
    pub min_id: Option<i64>,

    /// Only retrieve messages with an ID smaller than this.
    #[arg(long)]
    pub max_id: Option<i64>,

    /// Match the chat name case-insensitively.
    #[arg(short, long)]
    pub ignore_case: bool,

    /// Pick this candidate (1-based) when several chats match, instead of asking.
    #[arg(long)]
    pub choice: Option<usize>,

    /// Configuration file (default: ~/.chat-history-export/config.toml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Messaging gateway URL, overriding the configuration file.
    #[arg(long)]
    pub gateway_url: Option<String>,

    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The chat name query, words joined by single spaces.
    #[must_use]
    pub fn chat_query(&self) -> String {
        self.chat_name.join(" ")
    }

    /// API credentials from flags or environment.
    ///
    /// # Errors
    /// Returns a configuration error if either value is missing.
    pub fn credentials(&self) -> Result<Credentials> {
        match (self.api_id, self.api_hash.as_deref()) {
            (Some(api_id), Some(api_hash)) if !api_hash.is_empty() => Ok(Credentials {
                api_id,
                api_hash: api_hash.to_string(),
            }),
            _ => Err(AppError::Config {
                message: "TELEGRAM_API_ID and TELEGRAM_API_HASH not found. \
                          Provide them with --api-id/--api-hash or as environment variables."
                    .into(),
            }),
        }
    }

    /// History bounds.
    #[must_use]
    pub const fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            limit: self.limit,
            offset_date: self.offset_date,
            min_id: self.min_id,
            max_id: self.max_id,
        }
    }
}
