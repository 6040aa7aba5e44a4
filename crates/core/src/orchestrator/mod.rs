//! Run orchestrator.
//!
//! Drives a single pass over the listing page:
//! authenticate, fetch, filter against history and seeders, download, record.
//! Everything happens sequentially; the first unhandled error ends the run
//! without undoing what was already written.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::{Orchestrator, StateUpdateCallback};
pub use types::{OrchestratorError, RunState, RunSummary, SessionOrigin};
