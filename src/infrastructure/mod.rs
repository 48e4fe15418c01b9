//! Infrastructure layer - external adapters (gateway, session file, filesystem).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod client;
pub mod config;
pub mod document_writer;
pub mod gateway;
#[cfg(test)]
pub mod memory_client;
pub mod session_store;

pub use client::{HistoryQuery, MessagingClient, Session};
pub use config::load_config;
pub use document_writer::write_document;
pub use gateway::GatewayClient;
pub use session_store::SessionStore;
