//! Types for listing extraction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ListingConfig;

/// Errors raised while reading the listing page. Any of them aborts the run.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Torrents table not found")]
    TableNotFound,

    #[error("Row {row}: missing {element}")]
    MissingElement { row: usize, element: &'static str },

    #[error("Row {row}: invalid {field} {text:?}")]
    InvalidField {
        row: usize,
        field: &'static str,
        text: String,
    },

    #[error("Invalid size {0:?}")]
    InvalidSize(String),

    #[error("Invalid count {0:?}")]
    InvalidCount(String),
}

/// One torrent as shown on the listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentRecord {
    /// Tracker identifier, taken from the download link's `id` parameter.
    pub id: String,
    pub name: String,
    pub category: String,
    /// Size normalized to gigabytes (1 GB = 1024 MB).
    pub size_gb: f64,
    pub seeders: u64,
    /// Completed downloads recorded by the tracker.
    pub snatched: u64,
}

impl TorrentRecord {
    /// Whether anyone is seeding this torrent.
    pub fn is_healthy(&self) -> bool {
        self.seeders > 0
    }
}

/// Row structure of the torrents table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingLayout {
    /// Leading rows that are not torrents.
    pub header_rows: usize,
    /// Rows after each torrent row that are skipped.
    pub detail_rows: usize,
}

impl Default for ListingLayout {
    fn default() -> Self {
        Self {
            header_rows: 2,
            detail_rows: 1,
        }
    }
}

impl From<&ListingConfig> for ListingLayout {
    fn from(config: &ListingConfig) -> Self {
        Self {
            header_rows: config.header_rows,
            detail_rows: config.detail_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_healthy() {
        let mut record = TorrentRecord {
            id: "1".to_string(),
            name: "Test".to_string(),
            category: "Movies".to_string(),
            size_gb: 1.0,
            seeders: 0,
            snatched: 3,
        };
        assert!(!record.is_healthy());
        record.seeders = 1;
        assert!(record.is_healthy());
    }

    #[test]
    fn test_layout_from_config() {
        let config = ListingConfig {
            header_rows: 1,
            detail_rows: 0,
        };
        let layout = ListingLayout::from(&config);
        assert_eq!(layout.header_rows, 1);
        assert_eq!(layout.detail_rows, 0);
        assert_eq!(ListingLayout::default(), ListingLayout::from(&ListingConfig::default()));
    }
}
