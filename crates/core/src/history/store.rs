use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::listing::TorrentRecord;

use super::{HistoryEntry, HistoryError};

/// Previously downloaded torrents, loaded once and then only appended to.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: HashMap<String, HistoryEntry>,
    /// The file on disk does not end with a newline yet.
    unterminated: bool,
}

impl HistoryStore {
    /// Read the whole log. A missing file is an empty history.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(source) => return Err(HistoryError::Read { path, source }),
        };

        let entries: HashMap<String, HistoryEntry> = content
            .lines()
            .filter_map(HistoryEntry::parse_line)
            .map(|entry| (entry.id.clone(), entry))
            .collect();

        let unterminated = !content.is_empty() && !content.ends_with('\n');
        if unterminated {
            warn!(
                path = %path.display(),
                "History does not end with a newline, next append starts a new line"
            );
        }

        debug!(path = %path.display(), entries = entries.len(), "Loaded history");
        Ok(Self {
            path,
            entries,
            unterminated,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append one line for `record` and remember its id.
    pub async fn append(&mut self, record: &TorrentRecord) -> Result<(), HistoryError> {
        let entry = HistoryEntry::from_record(record);
        let mut line = String::new();
        if self.unterminated {
            line.push('\n');
        }
        line.push_str(&entry.to_line());
        line.push('\n');

        let append_err = |source| HistoryError::Append {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(append_err)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(append_err)?;
        file.write_all(line.as_bytes()).await.map_err(append_err)?;
        file.flush().await.map_err(append_err)?;

        self.unterminated = false;
        self.entries.insert(entry.id.clone(), entry);
        Ok(())
    }
}
