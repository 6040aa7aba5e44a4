//! Run lifecycle integration tests.
//!
//! Each test drives complete runs against a fake tracker:
//! authenticate -> fetch listing -> filter -> download -> record

mod common;

use std::sync::{Arc, Mutex};

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{TestHarness, SESSION_COOKIE};
use snatcher_core::{
    testing::fixtures::ListingRow, FetchError, OrchestratorError, RunState, SessionError,
    SessionOrigin, StateUpdateCallback,
};

#[tokio::test]
async fn test_first_run_logs_in_and_downloads() {
    let h = TestHarness::new().await;
    h.tracker.accept_login(1).await;
    h.tracker
        .serve_listing(&[ListingRow::new("42", "Some.Movie.2024", 5).size("2.00GB")], 1)
        .await;
    h.tracker.serve_torrent("42", b"d8:announce...e", 1).await;

    let mut orchestrator = h.orchestrator(false).await;
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.session, SessionOrigin::LoggedIn);
    assert_eq!(summary.downloaded, vec!["42".to_string()]);
    assert_eq!(orchestrator.state(), RunState::Idle);

    assert_eq!(std::fs::read(h.torrent_path("42")).unwrap(), b"d8:announce...e");
    let lines = h.history_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("42,"));
    assert!(lines[0].contains("2.000GB"));

    assert!(h.session_path().exists(), "session persisted after login");
    assert_eq!(h.solver.recorded_images().await, vec![b"captcha".to_vec()]);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let h = TestHarness::new().await;
    // One login across both runs: the second run restores the saved session.
    h.tracker.accept_login(1).await;
    h.tracker
        .serve_listing(&[ListingRow::new("42", "Some.Movie.2024", 5)], 2)
        .await;
    h.tracker.serve_torrent("42", b"torrent", 1).await;

    let first = h.orchestrator(false).await.run().await.unwrap();
    assert_eq!(first.downloaded.len(), 1);

    let second = h.orchestrator(false).await.run().await.unwrap();
    assert_eq!(second.session, SessionOrigin::Restored);
    assert_eq!(second.already_known, 1);
    assert!(second.downloaded.is_empty());
    assert_eq!(h.history_lines().len(), 1);
}

#[tokio::test]
async fn test_only_new_seeded_torrents_are_downloaded() {
    let h = TestHarness::new().await;
    std::fs::write(h.history_path(), "10,Old,Movies,1.000GB,4,9\n").unwrap();

    h.tracker.accept_login(1).await;
    h.tracker
        .serve_listing(
            &[
                ListingRow::new("10", "Already.Have.It", 8),
                ListingRow::new("11", "Nobody.Seeds.This", 0),
                ListingRow::new("12", "Fresh.One", 1).size("700.5MB"),
                ListingRow::new("13", "Another", 3).seeders_text("1,203"),
            ],
            1,
        )
        .await;
    h.tracker.serve_torrent("12", b"twelve", 1).await;
    h.tracker.serve_torrent("13", b"thirteen", 1).await;

    let summary = h.orchestrator(false).await.run().await.unwrap();

    assert_eq!(summary.listed, 4);
    assert_eq!(summary.already_known, 1);
    assert_eq!(summary.unhealthy, 1);
    assert_eq!(summary.downloaded, vec!["12".to_string(), "13".to_string()]);
    assert!(!h.torrent_path("10").exists());
    assert!(!h.torrent_path("11").exists());

    let lines = h.history_lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("10,"));
    assert!(lines[1].starts_with("12,"));
    assert!(lines[2].starts_with("13,"));
}

#[tokio::test]
async fn test_restored_session_skips_login() {
    let h = TestHarness::new().await;
    h.seed_session().await;

    h.tracker.accept_login(0).await;
    Mock::given(method("GET"))
        .and(path("/torrents.php"))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            snatcher_core::testing::fixtures::listing_page(&[]),
        ))
        .expect(1)
        .mount(&h.tracker.server)
        .await;

    let summary = h.orchestrator(false).await.run().await.unwrap();

    assert_eq!(summary.session, SessionOrigin::Restored);
    assert_eq!(summary.listed, 0);
    assert_eq!(h.solver.decode_count().await, 0);
}

#[tokio::test]
async fn test_failed_login_persists_nothing_and_fetches_nothing() {
    let h = TestHarness::new().await;
    h.tracker.reject_login().await;
    h.tracker.serve_listing(&[], 0).await;

    let mut orchestrator = h.orchestrator(false).await;
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(
        err,
        OrchestratorError::Session(SessionError::Authentication { .. })
    ));
    assert_eq!(orchestrator.state(), RunState::Fatal);
    assert!(!h.session_path().exists());
    assert!(h.history_lines().is_empty());
}

#[tokio::test]
async fn test_expired_session_is_discarded() {
    let h = TestHarness::new().await;
    h.seed_session().await;

    h.tracker.serve_login_page().await;
    Mock::given(method("GET"))
        .and(path("/torrents.php"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/login.php"))
        .expect(1)
        .mount(&h.tracker.server)
        .await;

    let mut orchestrator = h.orchestrator(false).await;
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(
        err,
        OrchestratorError::Transport(FetchError::SessionExpired { .. })
    ));
    assert!(!h.session_path().exists(), "stale session removed");
    assert_eq!(h.solver.decode_count().await, 0);
}

#[tokio::test]
async fn test_partial_run_keeps_completed_downloads() {
    let h = TestHarness::new().await;
    h.tracker.accept_login(1).await;
    h.tracker
        .serve_listing(
            &[ListingRow::new("42", "First", 5), ListingRow::new("43", "Second", 5)],
            1,
        )
        .await;
    h.tracker.serve_torrent("42", b"ok", 1).await;
    h.tracker.fail_torrent("43", 503).await;

    let err = h.orchestrator(false).await.run().await.unwrap_err();

    assert!(matches!(
        err,
        OrchestratorError::Transport(FetchError::Status { status: 503, .. })
    ));
    assert!(h.torrent_path("42").exists());
    assert!(!h.torrent_path("43").exists());
    let lines = h.history_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("42,"));
}

#[tokio::test]
async fn test_malformed_listing_is_fatal() {
    let h = TestHarness::new().await;
    h.tracker.accept_login(1).await;
    Mock::given(method("GET"))
        .and(path("/torrents.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>maintenance</body></html>"))
        .mount(&h.tracker.server)
        .await;

    let mut orchestrator = h.orchestrator(false).await;
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, OrchestratorError::Listing(_)));
    assert_eq!(orchestrator.state(), RunState::Fatal);
}

#[tokio::test]
async fn test_dry_run_touches_nothing() {
    let h = TestHarness::new().await;
    h.tracker.accept_login(1).await;
    h.tracker
        .serve_listing(&[ListingRow::new("42", "Some.Movie", 5)], 1)
        .await;
    h.tracker.serve_torrent("42", b"torrent", 0).await;

    let states: Arc<Mutex<Vec<RunState>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&states);
    let callback: StateUpdateCallback = Arc::new(move |state: RunState, _id: Option<&str>| {
        sink.lock().unwrap().push(state);
    });

    let mut orchestrator = h.orchestrator(true).await.with_update_callback(callback);
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.selected, vec!["42".to_string()]);
    assert!(summary.downloaded.is_empty());
    assert!(!h.output_dir().exists());
    assert!(h.history_lines().is_empty());
    assert!(!states.lock().unwrap().contains(&RunState::Downloading));
}
