//! Domain layer - core types and errors.
//!
//! This layer contains pure domain models and error types
//! without any I/O.

pub mod config;
pub mod error;
pub mod models;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use models::{
    Account, ChatIdentity, Credentials, Dialog, ExportDocument, ExportStats, MessageType,
    NormalizedRecord, RawMessage, RawSender, SenderInfo, SenderType,
};
