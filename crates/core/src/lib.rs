pub mod auth;
pub mod config;
pub mod fetcher;
pub mod history;
pub mod listing;
pub mod orchestrator;
pub mod session;
pub mod testing;

pub use auth::{
    create_captcha_solver, CaptchaError, CaptchaSolver, CommandCaptchaSolver, CredentialError,
    CredentialStore, Credentials, StaticCredentialStore,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use fetcher::{FetchError, PageFetcher};
pub use history::{HistoryEntry, HistoryError, HistoryStore};
pub use listing::{parse_listing, ListingError, ListingLayout, TorrentRecord};
pub use orchestrator::{
    Orchestrator, OrchestratorConfig, OrchestratorError, RunState, RunSummary, SessionOrigin,
    StateUpdateCallback,
};
pub use session::{
    LoginForm, SessionError, SessionJar, SessionManager, SessionState, SessionStore,
};
