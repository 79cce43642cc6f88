//! Message import. Reads a corpus from JSON or CSV files.
//!
//! JSON: array of `{channel, author, content, timestamp}` objects.
//! CSV: header `channel,author,content,timestamp`, parsed with the `csv` crate.
//! Timestamps are RFC 3339 with an explicit offset.

use crate::domain::{DomainError, Message};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Row as it appears in import files.
#[derive(Debug, Deserialize)]
struct MessageRow {
    channel: String,
    author: String,
    content: String,
    timestamp: String,
}

impl MessageRow {
    fn into_message(self, index: usize) -> Result<Message, DomainError> {
        let timestamp = DateTime::<FixedOffset>::parse_from_rfc3339(self.timestamp.trim())
            .map_err(|e| {
                DomainError::Import(format!(
                    "row {}: invalid timestamp {:?}: {}",
                    index + 1,
                    self.timestamp,
                    e
                ))
            })?;
        if self.channel.trim().is_empty() || self.author.trim().is_empty() {
            return Err(DomainError::Import(format!(
                "row {}: channel and author must not be empty",
                index + 1
            )));
        }
        Ok(Message::new(self.channel, self.author, self.content, timestamp))
    }
}

/// Parse a JSON array of messages.
pub fn messages_from_json(input: &str) -> Result<Vec<Message>, DomainError> {
    let rows: Vec<MessageRow> = serde_json::from_str(input)
        .map_err(|e| DomainError::Import(format!("invalid JSON: {}", e)))?;
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| row.into_message(i))
        .collect()
}

/// Parse CSV with a `channel,author,content,timestamp` header.
pub fn messages_from_csv(input: &str) -> Result<Vec<Message>, DomainError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(input.as_bytes());
    rdr.deserialize::<MessageRow>()
        .enumerate()
        .map(|(i, row)| {
            row.map_err(|e| DomainError::Import(format!("row {}: {}", i + 1, e)))?
                .into_message(i)
        })
        .collect()
}

/// Load messages from a `.json` or `.csv` file.
pub async fn load_messages(path: &Path) -> Result<Vec<Message>, DomainError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let input = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DomainError::Import(format!("{}: {}", path.display(), e)))?;

    let messages = match extension.as_deref() {
        Some("json") => messages_from_json(&input)?,
        Some("csv") => messages_from_csv(&input)?,
        other => {
            return Err(DomainError::Import(format!(
                "unsupported file type {:?}; expected .json or .csv",
                other.unwrap_or("")
            )));
        }
    };

    info!(path = %path.display(), count = messages.len(), "loaded messages from file");
    Ok(messages)
}
