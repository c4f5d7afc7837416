//! Discovery phase against a mock directory

use crate::common::{candidate_url, create_test_config, mount_empty, mount_profile, RecordingObserver};
use firm_harvest::config::{resolve_stealth_profile, Config};
use firm_harvest::crawler::{CrawlEngine, Session};
use firm_harvest::state::{CrawlState, PhaseState};
use firm_harvest::storage::{JsonStateStore, StateStore, StorageResult};
use firm_harvest::HarvestError;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_session(config: &Config, cancel: CancellationToken) -> Session {
    let profile = resolve_stealth_profile(&config.stealth).unwrap();
    Session::new(config, profile, cancel).unwrap()
}

fn create_engine(config: &Config) -> CrawlEngine {
    CrawlEngine::new(config.run.clone()).with_checkpoint_every(config.pacing.test_checkpoint_every)
}

#[tokio::test]
async fn test_discovery_confirms_marked_profiles() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_profile(&server, 1000).await;
    mount_empty(&server, 1001).await;
    mount_profile(&server, 1002).await;
    // 1003 and 1004 fall through to wiremock's 404

    let config = create_test_config(&server, dir.path(), "new", 1000, 1004);
    let mut session = create_session(&config, CancellationToken::new());
    let mut store = JsonStateStore::in_directory(dir.path());
    let observer = RecordingObserver::new();

    let mut engine = create_engine(&config);
    let report = engine.run(&mut session, &mut store, &observer).await.unwrap();

    assert_eq!(report.outcome, PhaseState::Completed);
    assert_eq!(engine.state(), PhaseState::Completed);
    assert_eq!(report.processed, 5);
    assert_eq!(report.last_processed_id, 1004);
    assert_eq!(
        report.discovered,
        vec![candidate_url(&server, 1000), candidate_url(&server, 1002)]
    );

    let metrics = session.metrics();
    assert_eq!(metrics.requests_made, 5);
    assert_eq!(metrics.successful, 2);
    assert_eq!(metrics.failed, 3);

    let saved = store.load().unwrap().expect("state should be persisted");
    assert_eq!(saved.last_processed_id, 1004);
    assert_eq!(saved.discovered_count(), 2);
}

#[tokio::test]
async fn test_progress_is_monotonic_and_ends_at_100() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_profile(&server, 1001).await;

    let config = create_test_config(&server, dir.path(), "new", 1000, 1003);
    let mut session = create_session(&config, CancellationToken::new());
    let mut store = JsonStateStore::in_directory(dir.path());
    let observer = RecordingObserver::new();

    create_engine(&config)
        .run(&mut session, &mut store, &observer)
        .await
        .unwrap();

    let progress = observer.crawl_percents();
    assert_eq!(progress, vec![25.0, 50.0, 75.0, 100.0]);
    assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]));

    // One metrics snapshot per request
    assert_eq!(observer.snapshots.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_resume_continues_from_saved_id() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    for id in 1000..1003 {
        Mock::given(method("GET"))
            .and(path("/profile/"))
            .and(query_param("id", id.to_string()))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
    }
    mount_profile(&server, 1003).await;

    let mut saved = CrawlState::fresh(1003);
    saved.confirm(candidate_url(&server, 1000));
    let mut store = JsonStateStore::in_directory(dir.path());
    store.save(&saved).unwrap();

    let config = create_test_config(&server, dir.path(), "resume", 1000, 1004);
    let mut session = create_session(&config, CancellationToken::new());
    let observer = RecordingObserver::new();

    let report = create_engine(&config)
        .run(&mut session, &mut store, &observer)
        .await
        .unwrap();

    // The saved ID is probed again, then the rest of the range
    assert_eq!(report.processed, 2);
    assert_eq!(session.metrics().requests_made, 2);
    assert_eq!(
        report.discovered,
        vec![candidate_url(&server, 1000), candidate_url(&server, 1003)]
    );
}

#[tokio::test]
async fn test_new_run_discards_saved_progress() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_profile(&server, 1001).await;

    let mut saved = CrawlState::fresh(1002);
    saved.confirm("https://stale.example.com/?id=1".to_string());
    let mut store = JsonStateStore::in_directory(dir.path());
    store.save(&saved).unwrap();

    let config = create_test_config(&server, dir.path(), "new", 1000, 1002);
    let mut session = create_session(&config, CancellationToken::new());

    let report = create_engine(&config)
        .run(&mut session, &mut store, &RecordingObserver::new())
        .await
        .unwrap();

    assert_eq!(report.processed, 3);
    assert_eq!(report.discovered, vec![candidate_url(&server, 1001)]);
}

#[tokio::test]
async fn test_resume_beyond_range_end_fails_without_requests() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut store = JsonStateStore::in_directory(dir.path());
    store.save(&CrawlState::fresh(2000)).unwrap();

    let config = create_test_config(&server, dir.path(), "resume", 1000, 1004);
    let mut session = create_session(&config, CancellationToken::new());
    let observer = RecordingObserver::new();

    let mut engine = create_engine(&config);
    let result = engine.run(&mut session, &mut store, &observer).await;

    match result {
        Err(HarvestError::RangeMismatch { last_id, range_end }) => {
            assert_eq!(last_id, 2000);
            assert_eq!(range_end, 1004);
        }
        other => panic!("expected range mismatch, got {:?}", other),
    }
    assert_eq!(engine.state(), PhaseState::Failed);
    assert_eq!(observer.warnings().len(), 1);
    assert!(server.received_requests().await.unwrap().is_empty());

    // Saved progress is left untouched
    assert_eq!(store.load().unwrap().unwrap().last_processed_id, 2000);
}

#[tokio::test]
async fn test_rate_limit_then_stop_persists_state() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/profile/"))
        .and(query_param("id", "1000"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, dir.path(), "new", 1000, 1004);
    let cancel = CancellationToken::new();
    let mut session = create_session(&config, cancel.clone());
    let mut store = JsonStateStore::in_directory(dir.path());
    let observer = RecordingObserver::cancelling_on_warning(cancel);

    let mut engine = create_engine(&config);
    let report = engine.run(&mut session, &mut store, &observer).await.unwrap();

    assert_eq!(report.outcome, PhaseState::Stopped);
    assert_eq!(engine.state(), PhaseState::Stopped);
    assert_eq!(report.processed, 1);
    assert!(observer.warnings()[0].contains("Rate limited"));
    assert!(!observer.crawl_percents().contains(&100.0));

    let metrics = session.metrics();
    assert_eq!(metrics.requests_made, 1);
    assert_eq!(metrics.rate_limited, 1);

    let saved = store.load().unwrap().unwrap();
    assert_eq!(saved.last_processed_id, 1000);
}

#[tokio::test]
async fn test_cancel_before_start_sends_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let config = create_test_config(&server, dir.path(), "new", 1000, 1004);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut session = create_session(&config, cancel);
    let mut store = JsonStateStore::in_directory(dir.path());

    let report = create_engine(&config)
        .run(&mut session, &mut store, &RecordingObserver::new())
        .await
        .unwrap();

    assert_eq!(report.outcome, PhaseState::Stopped);
    assert_eq!(report.processed, 0);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(store.load().unwrap().unwrap().last_processed_id, 1000);
}

#[tokio::test]
async fn test_test_run_stops_at_test_count() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_profile(&server, 1001).await;

    let mut config = create_test_config(&server, dir.path(), "new", 1000, 1004);
    config.run.test_count = Some(1001);
    let mut session = create_session(&config, CancellationToken::new());
    let mut store = JsonStateStore::in_directory(dir.path());

    let report = create_engine(&config)
        .run(&mut session, &mut store, &RecordingObserver::new())
        .await
        .unwrap();

    assert_eq!(report.outcome, PhaseState::Completed);
    assert_eq!(report.processed, 2);
    assert_eq!(report.last_processed_id, 1001);
    assert_eq!(report.discovered, vec![candidate_url(&server, 1001)]);
}

#[tokio::test]
async fn test_unreachable_directory_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let mut config = create_test_config(&server, dir.path(), "new", 1, 2);
    config.target.url_template = "http://127.0.0.1:1/profile/?id={id}".to_string();
    config.target.request_timeout_secs = 1;

    let mut session = create_session(&config, CancellationToken::new());
    let mut store = JsonStateStore::in_directory(dir.path());

    let report = create_engine(&config)
        .run(&mut session, &mut store, &RecordingObserver::new())
        .await
        .unwrap();

    assert_eq!(report.outcome, PhaseState::Completed);
    assert!(report.discovered.is_empty());
    assert_eq!(session.metrics().failed, 2);
}

/// Store that records the last processed ID of every save
#[derive(Default)]
struct CountingStore {
    state: Option<CrawlState>,
    saves: Vec<u64>,
}

impl StateStore for CountingStore {
    fn load(&self) -> StorageResult<Option<CrawlState>> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &CrawlState) -> StorageResult<()> {
        self.saves.push(state.last_processed_id);
        self.state = Some(state.clone());
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.state = None;
        Ok(())
    }
}

#[tokio::test]
async fn test_test_run_checkpoints_every_five_ids() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut config = create_test_config(&server, dir.path(), "new", 1000, 1020);
    config.run.test_count = Some(1010);
    let mut session = create_session(&config, CancellationToken::new());
    let mut store = CountingStore::default();

    let report = create_engine(&config)
        .run(&mut session, &mut store, &RecordingObserver::new())
        .await
        .unwrap();

    assert_eq!(report.processed, 11);
    assert_eq!(store.saves, vec![1004, 1009, 1010]);
}

#[tokio::test]
async fn test_full_run_saves_only_at_the_end() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let config = create_test_config(&server, dir.path(), "new", 1000, 1010);
    let mut session = create_session(&config, CancellationToken::new());
    let mut store = CountingStore::default();

    create_engine(&config)
        .run(&mut session, &mut store, &RecordingObserver::new())
        .await
        .unwrap();

    assert_eq!(store.saves, vec![1010]);
}
