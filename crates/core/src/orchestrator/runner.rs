//! Run orchestrator implementation.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::auth::{CaptchaSolver, CredentialStore};
use crate::fetcher::FetchError;
use crate::history::HistoryStore;
use crate::listing::{parse_listing, TorrentRecord};
use crate::session::SessionManager;

use super::config::OrchestratorConfig;
use super::types::{OrchestratorError, RunState, RunSummary, SessionOrigin};

/// Called on every state transition with the new state and, while filtering
/// or downloading, the id of the record being handled.
pub type StateUpdateCallback = Arc<dyn Fn(RunState, Option<&str>) + Send + Sync>;

/// Drives one scrape of the listing page.
pub struct Orchestrator {
    config: OrchestratorConfig,
    session: SessionManager,
    credentials: Arc<dyn CredentialStore>,
    solver: Arc<dyn CaptchaSolver>,
    history: HistoryStore,
    state: RunState,
    update_callback: Option<StateUpdateCallback>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        session: SessionManager,
        credentials: Arc<dyn CredentialStore>,
        solver: Arc<dyn CaptchaSolver>,
        history: HistoryStore,
    ) -> Self {
        Self {
            config,
            session,
            credentials,
            solver,
            history,
            state: RunState::Idle,
            update_callback: None,
        }
    }

    /// Set a callback for state transitions.
    pub fn with_update_callback(mut self, callback: StateUpdateCallback) -> Self {
        self.update_callback = Some(callback);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Run once: authenticate, fetch the listing, download every new torrent
    /// that has seeders, and record each one in the history.
    ///
    /// On error the orchestrator ends in [`RunState::Fatal`]. Files and history
    /// lines written before the failure are kept.
    pub async fn run(&mut self) -> Result<RunSummary, OrchestratorError> {
        let started_at = Utc::now();
        match self.run_inner(started_at).await {
            Ok(summary) => {
                self.transition(RunState::Idle, None);
                Ok(summary)
            }
            Err(e) => {
                if matches!(
                    e,
                    OrchestratorError::Transport(FetchError::SessionExpired { .. })
                ) {
                    warn!("Session rejected by tracker, discarding persisted session");
                    if let Err(clear_err) = self.session.invalidate().await {
                        warn!("Failed to discard persisted session: {}", clear_err);
                    }
                }
                error!("Run failed: {}", e);
                self.transition(RunState::Fatal, None);
                Err(e)
            }
        }
    }

    async fn run_inner(
        &mut self,
        started_at: chrono::DateTime<Utc>,
    ) -> Result<RunSummary, OrchestratorError> {
        let session = self.authenticate().await?;

        self.transition(RunState::Fetching, None);
        let records = self.fetch_listing().await?;
        info!(records = records.len(), "Fetched listing");

        let mut summary = RunSummary {
            started_at,
            finished_at: started_at,
            session,
            listed: records.len(),
            already_known: 0,
            unhealthy: 0,
            selected: Vec::new(),
            downloaded: Vec::new(),
            dry_run: self.config.dry_run,
        };

        for record in &records {
            self.transition(RunState::Filtering, Some(&record.id));

            if self.history.contains(&record.id) {
                debug!(id = %record.id, "Already downloaded, skipping");
                summary.already_known += 1;
                continue;
            }
            if !record.is_healthy() {
                debug!(id = %record.id, "No seeders, skipping");
                summary.unhealthy += 1;
                continue;
            }

            summary.selected.push(record.id.clone());
            if self.config.dry_run {
                info!(id = %record.id, name = %record.name, "Would download (dry run)");
                continue;
            }

            self.transition(RunState::Downloading, Some(&record.id));
            self.download(record).await?;
            summary.downloaded.push(record.id.clone());
        }

        summary.finished_at = Utc::now();
        info!(
            listed = summary.listed,
            already_known = summary.already_known,
            unhealthy = summary.unhealthy,
            downloaded = summary.downloaded.len(),
            "Run complete"
        );
        Ok(summary)
    }

    /// Reuse the persisted session, or log in and persist the new one.
    async fn authenticate(&mut self) -> Result<SessionOrigin, OrchestratorError> {
        self.transition(RunState::Authenticating, None);

        if self.session.restore().await.is_some() {
            return Ok(SessionOrigin::Restored);
        }

        info!("No usable session, logging in");
        let state = self
            .session
            .login(self.credentials.as_ref(), self.solver.as_ref())
            .await?;
        self.session.persist(&state).await?;
        Ok(SessionOrigin::LoggedIn)
    }

    async fn fetch_listing(&self) -> Result<Vec<TorrentRecord>, OrchestratorError> {
        let page = self.session.fetcher().fetch(&self.config.listing_path).await?;
        let records = parse_listing(&page, &self.config.layout)?;
        Ok(records)
    }

    /// Fetch the torrent file, write it, then record it. The history line is
    /// only appended once the file is on disk.
    async fn download(&mut self, record: &TorrentRecord) -> Result<(), OrchestratorError> {
        let path = self.config.download_path_for(&record.id);
        let bytes = self.session.fetcher().download_bytes(&path).await?;

        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|source| OrchestratorError::Output {
                path: self.config.output_dir.clone(),
                source,
            })?;

        let target = self.config.output_path_for(&record.id);
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|source| OrchestratorError::Output {
                path: target.clone(),
                source,
            })?;

        self.history.append(record).await?;
        info!(
            id = %record.id,
            name = %record.name,
            size_gb = record.size_gb,
            seeders = record.seeders,
            "Downloaded {}",
            target.display()
        );
        Ok(())
    }

    fn transition(&mut self, state: RunState, id: Option<&str>) {
        self.state = state;
        if let Some(callback) = &self.update_callback {
            callback(state, id);
        }
    }
}
