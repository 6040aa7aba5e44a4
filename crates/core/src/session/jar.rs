//! Cookie jar backing the tracker client.
//!
//! Same role as `reqwest::cookie::Jar`, but the stored cookies can be read
//! back whole (domain, path, expiry, flags) so a session survives a restart
//! unchanged.

use std::sync::{PoisonError, RwLock};

use cookie_store::{Cookie, CookieStore, RawCookie};
use reqwest::header::HeaderValue;
use tracing::debug;
use url::Url;

#[derive(Debug, Default)]
pub struct SessionJar(RwLock<CookieStore>);

impl SessionJar {
    /// Add a cookie as if `url` had sent it in a `Set-Cookie` header.
    pub fn add_cookie_str(&self, cookie: &str, url: &Url) {
        let mut store = self.0.write().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = store.parse(cookie, url) {
            debug!(url = %url, error = %e, "Rejected cookie");
        }
    }

    /// Every unexpired cookie, including those that only live for the session.
    pub fn snapshot(&self) -> Vec<Cookie<'static>> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter_unexpired()
            .cloned()
            .collect()
    }

    /// Replace the jar's contents. Expired cookies are dropped.
    pub fn replace(&self, cookies: &[Cookie<'static>]) {
        let loaded = CookieStore::from_cookies(
            cookies.iter().cloned().map(Ok::<_, std::convert::Infallible>),
            false,
        )
        .unwrap_or_default();
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = loaded;
    }
}

impl reqwest::cookie::CookieStore for SessionJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let cookies = cookie_headers.filter_map(|value| {
            value
                .to_str()
                .ok()
                .and_then(|s| RawCookie::parse(s.to_owned()).ok())
        });
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .store_response_cookies(cookies, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self
            .0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_request_values(url)
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");

        if header.is_empty() {
            return None;
        }
        HeaderValue::from_str(&header).ok()
    }
}
