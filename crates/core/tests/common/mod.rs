//! Shared helpers for integration tests: a fake tracker on a local HTTP
//! server and a harness wiring the orchestrator against it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use snatcher_core::{
    testing::{fixtures, MockCaptchaSolver},
    config::TrackerConfig,
    Credentials, HistoryStore, ListingLayout, Orchestrator, OrchestratorConfig, SessionManager,
    SessionJar, SessionState, SessionStore, StaticCredentialStore,
};

pub const SESSION_COOKIE: &str = "c_secure_uid=7";

/// Local stand-in for the tracker site.
pub struct FakeTracker {
    pub server: MockServer,
}

impl FakeTracker {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn root(&self) -> Url {
        Url::parse(&format!("{}/", self.server.uri())).expect("valid root")
    }

    /// Login page, CAPTCHA image and landing page. `takelogin.php` must be
    /// mounted separately (see [`Self::accept_login`], [`Self::reject_login`]).
    pub async fn serve_login_page(&self) {
        Mock::given(method("GET"))
            .and(path("/login.php"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(fixtures::login_page("image.php?imagehash=ab12", "ab12")),
            )
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/image.php"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"captcha".to_vec()))
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/index.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>index</html>"))
            .mount(&self.server)
            .await;
    }

    /// Successful login, expected exactly `times` times.
    pub async fn accept_login(&self, times: u64) {
        self.serve_login_page().await;
        Mock::given(method("POST"))
            .and(path("/takelogin.php"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", "/index.php")
                    .insert_header("Set-Cookie", format!("{}; Path=/", SESSION_COOKIE).as_str()),
            )
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Login attempt that bounces back to the login page.
    pub async fn reject_login(&self) {
        self.serve_login_page().await;
        Mock::given(method("POST"))
            .and(path("/takelogin.php"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/login.php"))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Serve the listing page, expected exactly `times` times.
    pub async fn serve_listing(&self, rows: &[fixtures::ListingRow], times: u64) {
        Mock::given(method("GET"))
            .and(path("/torrents.php"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(fixtures::listing_page(rows)),
            )
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Serve a torrent body for `id`, expected exactly `times` times.
    pub async fn serve_torrent(&self, id: &str, body: &[u8], times: u64) {
        Mock::given(method("GET"))
            .and(path("/download.php"))
            .and(query_param("id", id))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Fail the download of `id` with `status`.
    pub async fn fail_torrent(&self, id: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path("/download.php"))
            .and(query_param("id", id))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}

/// Working directory and state files of one simulated installation.
pub struct TestHarness {
    pub tracker: FakeTracker,
    pub solver: MockCaptchaSolver,
    temp_dir: TempDir,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self {
            tracker: FakeTracker::start().await,
            solver: MockCaptchaSolver::with_answer("x7k2"),
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn session_path(&self) -> PathBuf {
        self.temp_dir.path().join("cookie.json")
    }

    pub fn history_path(&self) -> PathBuf {
        self.temp_dir.path().join("list.csv")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.temp_dir.path().join("tmp")
    }

    pub fn torrent_path(&self, id: &str) -> PathBuf {
        self.output_dir().join(format!("{}.torrent", id))
    }

    pub fn history_lines(&self) -> Vec<String> {
        read_lines(&self.history_path())
    }

    /// Write a persisted session for this tracker, as a previous run would have.
    pub async fn seed_session(&self) {
        let root = self.tracker.root();
        let jar = SessionJar::default();
        jar.add_cookie_str(&format!("{}; Path=/", SESSION_COOKIE), &root);
        SessionStore::new(self.session_path())
            .save(&SessionState::capture(&jar, &root))
            .await
            .expect("Failed to seed session");
    }

    /// Build an orchestrator the way the binary does: fresh client, history
    /// reloaded from disk.
    pub async fn orchestrator(&self, dry_run: bool) -> Orchestrator {
        let tracker = TrackerConfig::new(self.tracker.server.uri());
        let session = SessionManager::new(&tracker, SessionStore::new(self.session_path()))
            .expect("Failed to create session manager");
        let history = HistoryStore::load(self.history_path())
            .await
            .expect("Failed to load history");

        let config = OrchestratorConfig {
            listing_path: tracker.listing_path.clone(),
            download_path: tracker.download_path.clone(),
            output_dir: self.output_dir(),
            layout: ListingLayout::default(),
            dry_run,
        };

        Orchestrator::new(
            config,
            session,
            Arc::new(StaticCredentialStore::new(Credentials::new("alice", "secret"))),
            Arc::new(self.solver.clone()),
            history,
        )
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => content.lines().map(str::to_string).collect(),
        Err(_) => Vec::new(),
    }
}
