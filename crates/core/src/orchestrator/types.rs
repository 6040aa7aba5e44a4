//! Types for the run orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Login failed or the session could not be set up.
    #[error("session error: {0}")]
    Session(#[from] crate::session::SessionError),

    /// Network failure while fetching the listing or a torrent.
    #[error("transport error: {0}")]
    Transport(#[from] crate::fetcher::FetchError),

    /// The listing page did not have the expected shape.
    #[error("parse error: {0}")]
    Listing(#[from] crate::listing::ListingError),

    /// History log could not be written.
    #[error("history error: {0}")]
    History(#[from] crate::history::HistoryError),

    /// A torrent file could not be written.
    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Where the orchestrator is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Authenticating,
    Fetching,
    Filtering,
    Downloading,
    /// Terminal: the run stopped on an error.
    Fatal,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Authenticating => "authenticating",
            RunState::Fetching => "fetching",
            RunState::Filtering => "filtering",
            RunState::Downloading => "downloading",
            RunState::Fatal => "fatal",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the run obtained its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOrigin {
    Restored,
    LoggedIn,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub session: SessionOrigin,
    /// Records found on the listing page.
    pub listed: usize,
    /// Records skipped because their id is already in the history.
    pub already_known: usize,
    /// Records skipped because nobody seeds them.
    pub unhealthy: usize,
    /// Ids that qualified for download, in listing order.
    pub selected: Vec<String>,
    /// Ids actually downloaded (empty on a dry run).
    pub downloaded: Vec<String>,
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_state_display() {
        assert_eq!(RunState::Idle.to_string(), "idle");
        assert_eq!(RunState::Downloading.to_string(), "downloading");
        assert_eq!(RunState::Fatal.as_str(), "fatal");
    }

    #[test]
    fn test_run_summary_serialization() {
        let summary = RunSummary {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            session: SessionOrigin::LoggedIn,
            listed: 3,
            already_known: 1,
            unhealthy: 1,
            selected: vec!["42".to_string()],
            downloaded: vec!["42".to_string()],
            dry_run: false,
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"session\":\"logged_in\""));
        let parsed: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.downloaded, vec!["42".to_string()]);
    }

    #[test]
    fn test_error_display() {
        let err = OrchestratorError::Listing(crate::listing::ListingError::TableNotFound);
        assert_eq!(err.to_string(), "parse error: Torrents table not found");
    }
}
