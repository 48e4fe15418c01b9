//! Application layer - use cases and orchestration.
//!
//! This layer resolves chats, retrieves history and turns it into the
//! export document.

pub mod classifier;
pub mod fetcher;
pub mod formatter;
pub mod normalizer;
pub mod pipeline;
pub mod resolver;

pub use fetcher::FetchOptions;
pub use formatter::{default_output_file, format_document_json, format_stats};
pub use pipeline::{ExportPipeline, Stage};
pub use resolver::{ConsoleSelector, FixedSelector, SelectionStrategy};
