//! Full harvest: discovery, extraction and output

use crate::common::{create_test_config, mount_empty, mount_profile, RecordingObserver};
use firm_harvest::crawler::run_harvest;
use firm_harvest::state::PhaseState;
use firm_harvest::storage::STATE_FILE_NAME;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

#[tokio::test]
async fn test_harvest_writes_dataset() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_profile(&server, 1000).await;
    mount_empty(&server, 1001).await;
    mount_profile(&server, 1002).await;

    let config = create_test_config(&server, dir.path(), "new", 1000, 1002);
    let observer = RecordingObserver::new();

    let summary = run_harvest(&config, CancellationToken::new(), &observer)
        .await
        .unwrap();

    assert_eq!(summary.discovery, PhaseState::Completed);
    assert_eq!(summary.extraction, Some(PhaseState::Completed));
    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.failures, 0);

    // Three probes plus two extraction fetches share one metrics collector
    assert_eq!(summary.metrics.requests_made, 5);
    assert_eq!(summary.metrics.successful, 4);

    let files = summary.files.expect("dataset should be written");
    assert_eq!(files.records, dir.path().join("firms.xlsx"));
    assert!(files.records.exists());
    assert!(files.failures.is_none());
    assert!(dir.path().join(STATE_FILE_NAME).exists());

    assert_eq!(observer.crawl_percents().last(), Some(&100.0));
    assert_eq!(observer.extract_percents().last(), Some(&100.0));
}

#[tokio::test]
async fn test_harvest_without_discoveries_writes_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let config = create_test_config(&server, dir.path(), "new", 1000, 1001);
    let observer = RecordingObserver::new();

    let summary = run_harvest(&config, CancellationToken::new(), &observer)
        .await
        .unwrap();

    assert_eq!(summary.discovery, PhaseState::Completed);
    assert_eq!(summary.extraction, None);
    assert!(summary.files.is_none());
    assert!(observer
        .warnings()
        .iter()
        .any(|w| w.contains("No profiles were discovered")));
    assert!(!dir.path().join("firms.xlsx").exists());
}

#[tokio::test]
async fn test_stopped_discovery_skips_extraction() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_profile(&server, 1000).await;

    let config = create_test_config(&server, dir.path(), "new", 1000, 1002);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = run_harvest(&config, cancel, &RecordingObserver::new())
        .await
        .unwrap();

    assert_eq!(summary.discovery, PhaseState::Stopped);
    assert_eq!(summary.extraction, None);
    assert_eq!(summary.metrics.requests_made, 0);
    assert!(dir.path().join(STATE_FILE_NAME).exists());
}
