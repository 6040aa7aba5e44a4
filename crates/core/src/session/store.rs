use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{SessionError, SessionState};

/// File-backed storage for a single [`SessionState`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session.
    ///
    /// Returns `None` when the file is absent, unreadable, or not a session.
    pub async fn load(&self) -> Option<SessionState> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No persisted session");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read persisted session");
                return None;
            }
        };

        match serde_json::from_slice::<SessionState>(&data) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }

    /// Write the session, replacing any previous file.
    pub async fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        let json = serde_json::to_vec_pretty(state).map_err(|e| SessionError::Serialize {
            path: self.path.clone(),
            source: e,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.persist_error(e))?;
        }

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| self.persist_error(e))?;

        debug!(path = %self.path.display(), cookies = state.cookie_count(), "Saved session");
        Ok(())
    }

    /// Remove the persisted session so the next run logs in again.
    pub async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.persist_error(e)),
        }
    }

    fn persist_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Persist {
            path: self.path.clone(),
            source,
        }
    }
}
