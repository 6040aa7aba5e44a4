use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub credentials: CredentialsConfig,
    pub captcha: CaptchaConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Tracker site configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
    /// Site root (e.g., "https://bt.byr.cn/"). All paths are joined onto it.
    pub url: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_take_login_path")]
    pub take_login_path: String,
    /// Page the tracker redirects to after a successful login.
    #[serde(default = "default_landing_path")]
    pub landing_path: String,
    #[serde(default = "default_listing_path")]
    pub listing_path: String,
    #[serde(default = "default_download_path")]
    pub download_path: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl TrackerConfig {
    /// Tracker at `url` with every path at its default.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            login_path: default_login_path(),
            take_login_path: default_take_login_path(),
            landing_path: default_landing_path(),
            listing_path: default_listing_path(),
            download_path: default_download_path(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
        }
    }

    /// Site root, always ending with a single `/`.
    pub fn root(&self) -> String {
        format!("{}/", self.url.trim_end_matches('/'))
    }
}

fn default_login_path() -> String {
    "login.php".to_string()
}

fn default_take_login_path() -> String {
    "takelogin.php".to_string()
}

fn default_landing_path() -> String {
    "index.php".to_string()
}

fn default_listing_path() -> String {
    "torrents.php?page=1".to_string()
}

fn default_download_path() -> String {
    "download.php".to_string()
}

fn default_user_agent() -> String {
    "Magic Browser".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Login credentials
#[derive(Clone, Deserialize, Serialize)]
pub struct CredentialsConfig {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// External CAPTCHA solver configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptchaConfig {
    /// Program invoked once per CAPTCHA. Reads the image on stdin, prints the text.
    #[serde(default = "default_captcha_command")]
    pub command: PathBuf,
    /// Extra arguments placed before the model path.
    #[serde(default)]
    pub args: Vec<String>,
    /// Pre-trained classifier artifact, passed as the final argument.
    pub model_path: PathBuf,
}

fn default_captcha_command() -> PathBuf {
    PathBuf::from("decaptcha")
}

/// Listing table layout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListingConfig {
    /// Rows at the top of the table that are not torrents.
    #[serde(default = "default_header_rows")]
    pub header_rows: usize,
    /// Rows following each torrent row that carry no record.
    #[serde(default = "default_detail_rows")]
    pub detail_rows: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            header_rows: default_header_rows(),
            detail_rows: default_detail_rows(),
        }
    }
}

fn default_header_rows() -> usize {
    2
}

fn default_detail_rows() -> usize {
    1
}

/// Local state and output locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            session_path: default_session_path(),
            history_path: default_history_path(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_session_path() -> PathBuf {
    PathBuf::from("cookie.json")
}

fn default_history_path() -> PathBuf {
    PathBuf::from("list.csv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("tmp")
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub tracker: TrackerConfig,
    pub credentials: SanitizedCredentialsConfig,
    pub captcha: CaptchaConfig,
    pub listing: ListingConfig,
    pub storage: StorageConfig,
}

/// Sanitized credentials (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCredentialsConfig {
    pub username: String,
    pub password_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            tracker: config.tracker.clone(),
            credentials: SanitizedCredentialsConfig {
                username: config.credentials.username.clone(),
                password_configured: !config.credentials.password.is_empty(),
            },
            captcha: config.captcha.clone(),
            listing: config.listing.clone(),
            storage: config.storage.clone(),
        }
    }
}
