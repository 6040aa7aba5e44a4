use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use super::types::Credentials;

#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("CAPTCHA model not found: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("CAPTCHA solver not found: {path}")]
    SolverNotFound { path: PathBuf },

    #[error("CAPTCHA solver failed: {0}")]
    SolverFailed(String),

    #[error("CAPTCHA solver returned no text")]
    EmptyAnswer,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Credentials unavailable: {0}")]
    Unavailable(String),
}

/// Turns a CAPTCHA image into the text it shows.
#[async_trait]
pub trait CaptchaSolver: Send + Sync {
    /// Decode the raw image bytes (as served by the tracker).
    async fn decode(&self, image: &[u8]) -> Result<String, CaptchaError>;

    /// Name of this solver
    fn name(&self) -> &str;
}

/// Read-only source of login credentials.
pub trait CredentialStore: Send + Sync {
    fn credentials(&self) -> Result<Credentials, CredentialError>;
}
