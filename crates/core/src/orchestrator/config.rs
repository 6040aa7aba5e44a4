//! Orchestrator configuration.

use std::path::PathBuf;

use crate::config::Config;
use crate::listing::ListingLayout;

/// Settings for one run, derived from the loaded [`Config`].
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Listing page, relative to the tracker root.
    pub listing_path: String,

    /// Download endpoint, relative to the tracker root. `?id=<id>` is appended.
    pub download_path: String,

    /// Directory receiving `<id>.torrent` files.
    pub output_dir: PathBuf,

    /// Row structure of the listing table.
    pub layout: ListingLayout,

    /// Fetch and filter only; download nothing and leave the history untouched.
    pub dry_run: bool,
}

impl OrchestratorConfig {
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Path of the download endpoint for one torrent.
    pub fn download_path_for(&self, id: &str) -> String {
        format!("{}?id={}", self.download_path, urlencoding::encode(id))
    }

    /// Where the torrent file for `id` is written.
    pub fn output_path_for(&self, id: &str) -> PathBuf {
        self.output_dir.join(format!("{}.torrent", id))
    }
}

impl From<&Config> for OrchestratorConfig {
    fn from(config: &Config) -> Self {
        Self {
            listing_path: config.tracker.listing_path.clone(),
            download_path: config.tracker.download_path.clone(),
            output_dir: config.storage.output_dir.clone(),
            layout: ListingLayout::from(&config.listing),
            dry_run: false,
        }
    }
}
