//! Extraction phase against a mock directory

use crate::common::{candidate_url, create_test_config, mount_profile, RecordingObserver};
use firm_harvest::config::{resolve_stealth_profile, Config};
use firm_harvest::crawler::Session;
use firm_harvest::extract::ExtractionEngine;
use firm_harvest::output::XlsxWriter;
use firm_harvest::state::PhaseState;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_session(config: &Config, cancel: CancellationToken) -> Session {
    let profile = resolve_stealth_profile(&config.stealth).unwrap();
    Session::new(config, profile, cancel).unwrap()
}

const UNREACHABLE: &str = "http://127.0.0.1:1/profile/?id=1";

#[tokio::test]
async fn test_batch_extracts_records_and_collects_failures() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_profile(&server, 1000).await;

    let config = create_test_config(&server, dir.path(), "new", 1000, 1000);
    let mut session = create_session(&config, CancellationToken::new());
    let observer = RecordingObserver::new();

    let urls = vec![candidate_url(&server, 1000), UNREACHABLE.to_string()];
    let mut engine = ExtractionEngine::new("2024").unwrap();
    let report = engine
        .extract_batch(&mut session, &urls, &observer)
        .await
        .unwrap();

    assert_eq!(report.outcome, PhaseState::Completed);
    assert_eq!(engine.state(), PhaseState::Completed);

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.url, urls[0]);
    assert_eq!(record.firm_name.as_deref(), Some("Example & Partners LLP"));
    assert_eq!(record.amlaw_rank.as_deref(), Some("12"));
    assert_eq!(record.total_headcount.as_deref(), Some("1,190"));

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, UNREACHABLE);
    assert!(!report.failures[0].error.is_empty());

    assert_eq!(observer.extract_percents(), vec![50.0, 100.0]);
    assert_eq!(session.metrics().requests_made, 2);
}

#[tokio::test]
async fn test_non_200_page_is_parsed_not_failed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/profile/"))
        .and(query_param("id", "1000"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;

    let config = create_test_config(&server, dir.path(), "new", 1000, 1000);
    let mut session = create_session(&config, CancellationToken::new());

    let engine = ExtractionEngine::new("2024").unwrap();
    let record = engine
        .extract(&mut session, &candidate_url(&server, 1000))
        .await
        .unwrap();

    assert_eq!(record.missing_fields().len(), 10);
}

#[tokio::test]
async fn test_interim_checkpoints_are_written() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_profile(&server, 1000).await;
    mount_profile(&server, 1001).await;

    let config = create_test_config(&server, dir.path(), "new", 1000, 1001);
    let mut session = create_session(&config, CancellationToken::new());
    let writer = XlsxWriter::new(dir.path(), "firms");

    let urls = vec![candidate_url(&server, 1000), candidate_url(&server, 1001)];
    let mut engine = ExtractionEngine::new("2024")
        .unwrap()
        .with_checkpoints(Box::new(writer), 1);
    let report = engine
        .extract_batch(&mut session, &urls, &RecordingObserver::new())
        .await
        .unwrap();

    assert_eq!(report.records.len(), 2);
    assert!(dir.path().join("firms_interim.xlsx").exists());
    // No failures, so no interim failure list
    assert!(!dir.path().join("firms_failed_interim.xlsx").exists());
}

#[tokio::test]
async fn test_stopped_extraction_keeps_partial_results() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/profile/"))
        .and(query_param("id", "1000"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile/"))
        .and(query_param("id", "1001"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, dir.path(), "new", 1000, 1001);
    let cancel = CancellationToken::new();
    let mut session = create_session(&config, cancel.clone());
    let observer = RecordingObserver::cancelling_on_warning(cancel);

    let urls = vec![candidate_url(&server, 1000), candidate_url(&server, 1001)];
    let mut engine = ExtractionEngine::new("2024").unwrap();
    let report = engine
        .extract_batch(&mut session, &urls, &observer)
        .await
        .unwrap();

    assert_eq!(report.outcome, PhaseState::Stopped);
    assert_eq!(report.records.len(), 1);
    assert!(report.failures.is_empty());
    assert!(!observer.extract_percents().contains(&100.0));
    assert_eq!(session.metrics().rate_limited, 1);
}
