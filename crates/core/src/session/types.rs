//! Types for session management.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use cookie_store::Cookie;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::SessionJar;
use crate::auth::{CaptchaError, CredentialError};
use crate::fetcher::FetchError;

/// Errors that can occur while establishing or saving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The login form was submitted but did not land on the authenticated page.
    #[error("Authentication failed: expected {expected}, landed on {actual}")]
    Authentication { expected: String, actual: String },

    /// The login page is missing an element the form needs.
    #[error("Login form incomplete: {0}")]
    LoginForm(String),

    #[error("Transport error: {0}")]
    Transport(#[from] FetchError),

    #[error("CAPTCHA error: {0}")]
    Captcha(#[from] CaptchaError),

    #[error("Credential error: {0}")]
    Credentials(#[from] CredentialError),

    #[error("Invalid tracker url '{url}': {source}")]
    InvalidRoot {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to persist session to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode session for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable authenticated context: every cookie the tracker issued, with its
/// domain, path, expiry and flags.
///
/// The serialized form is private to this crate and may change; only
/// round-trip fidelity through [`SessionStore`](super::SessionStore) matters.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    root: String,
    cookies: Vec<Cookie<'static>>,
    saved_at: DateTime<Utc>,
}

impl SessionState {
    /// Snapshot the live cookies in `jar`, recorded against `root`.
    pub fn capture(jar: &SessionJar, root: &Url) -> Self {
        Self {
            root: root.to_string(),
            cookies: jar.snapshot(),
            saved_at: Utc::now(),
        }
    }

    /// Replace the contents of `jar` with the saved cookies.
    pub fn apply(&self, jar: &SessionJar) {
        jar.replace(&self.cookies);
    }

    /// Root URL the cookies were issued for.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn cookie_count(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }
}

// Cookie values are credentials.
impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.cookies.iter().map(|c| c.name()).collect();
        f.debug_struct("SessionState")
            .field("root", &self.root)
            .field("cookies", &names)
            .field("saved_at", &self.saved_at)
            .finish()
    }
}
