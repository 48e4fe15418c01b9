//! Domain-level error types for chat-history-export.
//!
//! All errors are typed with `thiserror`. Per-record errors are recoverable
//! and only ever logged; everything else terminates the run.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Credentials rejected or session could not be established.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// No dialog name contains the query.
    #[error("No chat found matching '{query}'")]
    ChatNotFound { query: String },

    /// Disambiguation returned an ordinal outside the candidate list.
    #[error("Invalid selection: {message}")]
    InvalidSelection { message: String },

    /// Network or service failure while talking to the gateway.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Sender entity of a shape the classifier does not know.
    #[error("Unknown sender type: {kind}")]
    UnknownSender { kind: String },

    /// A record could not be serialized.
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The export document could not be persisted.
    #[error("Failed to write {}: {message}", .path.display())]
    Write {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Session store failure.
    #[error("Session store error: {message}")]
    Session {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a transport error from a reqwest error.
    pub fn transport(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a serialization error.
    pub fn serialization(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a session store error from rusqlite error.
    pub fn session(err: rusqlite::Error) -> Self {
        Self::Session {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a write error for the given target path.
    pub fn write(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Whether the error concerns a single record and must not abort the run.
    #[must_use]
    pub const fn is_per_record(&self) -> bool {
        matches!(self, Self::UnknownSender { .. } | Self::Serialization { .. })
    }

    /// Process exit code for a fatal error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Auth { .. } => 2,
            Self::ChatNotFound { .. } => 3,
            Self::Write { .. } => 4,
            _ => 1,
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
