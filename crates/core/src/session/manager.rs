//! Session manager: owns the cookie jar and the HTTP client built on it.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::auth::{CaptchaSolver, CredentialStore};
use crate::config::TrackerConfig;
use crate::fetcher::{FetchError, PageFetcher};

use super::{SessionError, SessionJar, SessionState, SessionStore};

static CAPTCHA_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"img[alt="CAPTCHA"]"#).expect("valid selector"));
static IMAGE_HASH: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"input[name="imagehash"]"#).expect("valid selector"));

/// The CAPTCHA-related parts of the tracker's login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    /// `src` of the CAPTCHA image, relative to the tracker root.
    pub captcha_src: String,
    /// Token tying the submitted answer to the image that was served.
    pub image_hash: String,
}

impl LoginForm {
    /// Extract the CAPTCHA image reference and hash token from login page markup.
    pub fn extract(html: &str) -> Result<Self, SessionError> {
        let document = Html::parse_document(html);

        let captcha_src = document
            .select(&CAPTCHA_IMAGE)
            .next()
            .and_then(|img| img.value().attr("src"))
            .ok_or_else(|| SessionError::LoginForm("no CAPTCHA image".to_string()))?
            .to_string();

        let image_hash = document
            .select(&IMAGE_HASH)
            .next()
            .and_then(|input| input.value().attr("value"))
            .ok_or_else(|| SessionError::LoginForm("no imagehash input".to_string()))?
            .to_string();

        Ok(Self {
            captcha_src,
            image_hash,
        })
    }
}

/// Establishes and persists the authenticated tracker session.
pub struct SessionManager {
    jar: Arc<SessionJar>,
    fetcher: PageFetcher,
    store: SessionStore,
    login_path: String,
    take_login_path: String,
    landing_url: Url,
}

impl SessionManager {
    /// Create a manager with an empty cookie jar.
    pub fn new(config: &TrackerConfig, store: SessionStore) -> Result<Self, SessionError> {
        let root_url = config.root();
        let root = Url::parse(&root_url).map_err(|e| SessionError::InvalidRoot {
            url: root_url.clone(),
            source: e,
        })?;

        let jar = Arc::new(SessionJar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(SessionError::Client)?;

        let fetcher = PageFetcher::new(client, root, &config.login_path)?;
        let landing_url = fetcher.url(&config.landing_path)?;

        Ok(Self {
            jar,
            fetcher,
            store,
            login_path: config.login_path.clone(),
            take_login_path: config.take_login_path.clone(),
            landing_url,
        })
    }

    /// Fetcher sharing this manager's cookies.
    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Load a previously persisted session into the cookie jar.
    ///
    /// `None` means there is nothing usable on disk and a login is needed.
    pub async fn restore(&self) -> Option<SessionState> {
        let state = self.store.load().await?;
        let root = self.fetcher.root();

        if state.root() != root.as_str() {
            warn!(
                saved_for = state.root(),
                tracker = %root,
                "Persisted session belongs to a different tracker, ignoring"
            );
            return None;
        }
        if state.is_empty() {
            debug!("Persisted session has no cookies, ignoring");
            return None;
        }

        state.apply(&self.jar);
        info!(
            cookies = state.cookie_count(),
            saved_at = %state.saved_at(),
            "Restored session from {}",
            self.store.path().display()
        );
        Some(state)
    }

    /// Log in through the CAPTCHA-protected form.
    ///
    /// Nothing is persisted here; on success the caller persists the state.
    pub async fn login(
        &self,
        credentials: &dyn CredentialStore,
        solver: &dyn CaptchaSolver,
    ) -> Result<SessionState, SessionError> {
        let credentials = credentials.credentials()?;

        let login_url = self.fetcher.url(&self.login_path)?;
        let page = self
            .fetcher
            .get_url(login_url)
            .await?
            .text()
            .await
            .map_err(FetchError::from)?;
        let form = LoginForm::extract(&page)?;
        debug!(image = %form.captcha_src, hash = %form.image_hash, "Found login form");

        let image_url = self.fetcher.url(&form.captcha_src)?;
        let image = self
            .fetcher
            .get_url(image_url)
            .await?
            .bytes()
            .await
            .map_err(FetchError::from)?;

        let answer = solver.decode(&image).await?;
        debug!(solver = solver.name(), text = %answer, "Solved CAPTCHA");

        let take_login_url = self.fetcher.url(&self.take_login_path)?;
        let response = self
            .fetcher
            .post_form(
                take_login_url,
                &[
                    ("username", credentials.username.as_str()),
                    ("password", credentials.password()),
                    ("imagestring", answer.as_str()),
                    ("imagehash", form.image_hash.as_str()),
                ],
            )
            .await?;

        if response.url() != &self.landing_url {
            error!(landed_on = %response.url(), "Login error");
            return Err(SessionError::Authentication {
                expected: self.landing_url.to_string(),
                actual: response.url().to_string(),
            });
        }

        let state = SessionState::capture(&self.jar, self.fetcher.root());
        info!(
            user = %credentials.username,
            cookies = state.cookie_count(),
            "Logged in"
        );
        Ok(state)
    }

    /// Save the session, overwriting any earlier one.
    pub async fn persist(&self, state: &SessionState) -> Result<(), SessionError> {
        self.store.save(state).await
    }

    /// Forget the persisted session so the next run logs in.
    pub async fn invalidate(&self) -> Result<(), SessionError> {
        self.store.clear().await
    }
}
