//! Types for the download history.

use std::path::PathBuf;
use thiserror::Error;

use crate::listing::TorrentRecord;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to read history {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to append to history {path}: {source}")]
    Append {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A line of the history log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: String,
    /// Everything after the id, as written.
    pub details: String,
}

impl HistoryEntry {
    /// Build the entry recorded for a downloaded torrent.
    pub fn from_record(record: &TorrentRecord) -> Self {
        Self {
            id: record.id.clone(),
            details: format!(
                "{},{},{:.3}GB,{},{}",
                csv_field(&record.name),
                csv_field(&record.category),
                record.size_gb,
                record.seeders,
                record.snatched
            ),
        }
    }

    /// Parse a log line. Blank lines and lines without an id yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (id, details) = line.split_once(',').unwrap_or((line, ""));
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        Some(Self {
            id: id.to_string(),
            details: details.to_string(),
        })
    }

    /// The line as it appears in the log, without the trailing newline.
    pub fn to_line(&self) -> String {
        if self.details.is_empty() {
            self.id.clone()
        } else {
            format!("{},{}", self.id, self.details)
        }
    }
}

/// Quote a field if it would otherwise break the comma-separated layout.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\"").replace(['\n', '\r'], " "))
    } else {
        value.to_string()
    }
}
