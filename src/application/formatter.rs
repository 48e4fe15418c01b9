//! Output formatting.
//!
//! Renders the export document, the disambiguation table and the run summary.

use std::fmt::Write;

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::domain::{ExportDocument, ExportStats};

use super::resolver::Candidate;

/// Prefix of the default output file name.
const DEFAULT_FILE_PREFIX: &str = "telegram_history-";

/// Formats the document as a JSON array indented by four spaces.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_document_json(document: &ExportDocument) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Formats the disambiguation candidates as a numbered table.
pub fn format_candidates_table(candidates: &[Candidate]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Chat", "Last message"]);

    for candidate in candidates {
        table.add_row(vec![
            candidate.ordinal.to_string(),
            candidate.chat.display_name.clone(),
            candidate.preview.clone(),
        ]);
    }

    table.to_string()
}

/// Formats run statistics for display.
pub fn format_stats(stats: &ExportStats) -> String {
    let mut out = format!(
        "{}\n  Fetched: {}\n  Exported: {}",
        "📊 Export summary".bold(),
        stats.fetched.to_string().cyan(),
        stats.exported.to_string().green(),
    );

    if stats.truncated > 0 {
        let _ = write!(out, "\n  Over limit: {}", stats.truncated.to_string().yellow());
    }

    if stats.excluded() > 0 {
        let _ = write!(
            out,
            "\n  Excluded: {} ({} without sender name, {} unknown sender, {} unserializable)",
            stats.excluded().to_string().yellow(),
            stats.excluded_nameless,
            stats.excluded_unknown_sender,
            stats.excluded_unserializable
        );
    }

    out
}

/// Default output file name for a chat.
pub fn default_output_file(chat_name: &str) -> String {
    let safe: String = chat_name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
            {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("{DEFAULT_FILE_PREFIX}{}.json", safe.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatIdentity, MessageType, NormalizedRecord, SenderType};

    #[test]
    fn test_document_json_uses_four_spaces() {
        let document = ExportDocument {
            records: vec![NormalizedRecord {
                message_id: 1,
                chat_name: "NewsCo".into(),
                chat_id: -100,
                date: "2021-01-02 00:00:00".into(),
                message_type: MessageType::Text,
                sender_type: SenderType::Channel,
                sender_name: "NewsCo".into(),
                sender_username: None,
                sender_id: None,
                message: String::new(),
                views: None,
                reply_to_msg_id: None,
            }],
        };

        let json = format_document_json(&document).unwrap();

        assert!(json.starts_with("[\n    {\n        \"message_id\": 1,"));
        assert!(json.contains("\"sender_username\": null"));
        assert!(json.ends_with("}\n]"));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(format_document_json(&ExportDocument::default()).unwrap(), "[]");
    }

    #[test]
    fn test_candidates_table_lists_names() {
        let candidates = vec![Candidate {
            ordinal: 1,
            chat: ChatIdentity {
                id: 1,
                display_name: "Rust News".into(),
            },
            preview: "No messages".into(),
        }];
        let table = format_candidates_table(&candidates);
        assert!(table.contains("Rust News"));
        assert!(table.contains("No messages"));
    }

    #[test]
    fn test_stats_mentions_exclusions_only_when_present() {
        colored::control::set_override(false);

        let clean = ExportStats {
            fetched: 3,
            exported: 3,
            ..Default::default()
        };
        assert!(!format_stats(&clean).contains("Excluded"));

        let lossy = ExportStats {
            fetched: 3,
            exported: 1,
            excluded_nameless: 2,
            ..Default::default()
        };
        assert!(format_stats(&lossy).contains("Excluded: 2 (2 without sender name"));

        let over = ExportStats {
            fetched: 5,
            truncated: 2,
            exported: 3,
            ..Default::default()
        };
        assert!(format_stats(&over).contains("Over limit: 2"));
    }

    #[test]
    fn test_default_output_file() {
        assert_eq!(
            default_output_file("News/Updates: daily"),
            "telegram_history-News_Updates_ daily.json"
        );
    }
}
