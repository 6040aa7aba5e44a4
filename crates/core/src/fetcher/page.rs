//! Page fetcher implementation.

use reqwest::{Client, Response};
use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use super::FetchError;

/// Issues GET requests against the tracker root through the session's client.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    root: Url,
    login_url: Url,
}

impl PageFetcher {
    /// Create a fetcher for `root`. Responses that end up on `login_path`
    /// are reported as an expired session.
    pub fn new(client: Client, root: Url, login_path: &str) -> Result<Self, FetchError> {
        let login_url = join(&root, login_path)?;
        Ok(Self {
            client,
            root,
            login_url,
        })
    }

    /// Tracker root URL.
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Resolve a path relative to the tracker root.
    pub fn url(&self, path: &str) -> Result<Url, FetchError> {
        join(&self.root, path)
    }

    /// GET `root + path` and parse the body as HTML.
    pub async fn fetch(&self, path: &str) -> Result<Html, FetchError> {
        let body = self.get(path).await?.text().await?;
        Ok(Html::parse_document(&body))
    }

    /// GET `root + path` and return the raw body.
    pub async fn download_bytes(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let body = self.get(path).await?.bytes().await?;
        Ok(body.to_vec())
    }

    /// GET without the login-redirect check (used by the login flow itself).
    pub(crate) async fn get_url(&self, url: Url) -> Result<Response, FetchError> {
        debug!(url = %url, "GET");
        let response = self.client.get(url).send().await?;
        Ok(response.error_for_status()?)
    }

    /// POST a form. Redirects are followed; the caller inspects the final URL.
    pub(crate) async fn post_form(
        &self,
        url: Url,
        params: &[(&str, &str)],
    ) -> Result<Response, FetchError> {
        debug!(url = %url, "POST");
        let response = self.client.post(url).form(params).send().await?;
        Ok(response.error_for_status()?)
    }

    async fn get(&self, path: &str) -> Result<Response, FetchError> {
        let url = self.url(path)?;
        let response = self.get_url(url).await?;

        if self.is_login_page(response.url()) {
            warn!(url = %response.url(), "Request was redirected to the login page");
            return Err(FetchError::SessionExpired {
                url: response.url().to_string(),
            });
        }

        Ok(response)
    }

    fn is_login_page(&self, url: &Url) -> bool {
        url.host_str() == self.login_url.host_str() && url.path() == self.login_url.path()
    }
}

fn join(root: &Url, path: &str) -> Result<Url, FetchError> {
    root.join(path).map_err(|e| FetchError::InvalidPath {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
