//! Types for page fetching.

use thiserror::Error;

/// Transport-level failures. None of these are retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// The tracker sent the request back to its login page.
    #[error("Session expired: redirected to {url}")]
    SessionExpired { url: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::ConnectionFailed(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FetchError::Status {
            status: 502,
            url: "https://bt.example.org/torrents.php".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 502 from https://bt.example.org/torrents.php"
        );

        let err = FetchError::SessionExpired {
            url: "https://bt.example.org/login.php".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Session expired: redirected to https://bt.example.org/login.php"
        );
    }
}
