//! Integration tests for the screening HTTP server

use neuropath_engine::records::{LongitudinalRecord, LongitudinalRecordStore};
use neuropath_engine::server::{run, ServerConfig, ServerState};
use neuropath_engine::source::{ingest_channel, ChannelSource, SampleSender};
use neuropath_engine::{InferenceResult, ResultDiagnostics};
use std::sync::Arc;
use std::time::Duration;

async fn start_test_server(store: LongitudinalRecordStore) -> (
    std::net::SocketAddr,
    tokio::sync::oneshot::Sender<()>,
    SampleSender,
    ChannelSource,
) {
    let (ingest_tx, ingest_source) = ingest_channel(64);
    let state = Arc::new(ServerState::new(ingest_tx.clone(), store));

    let (addr, shutdown_tx) = run(ServerConfig::new(0), state)
        .await
        .expect("Failed to start server");

    // Give server time to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    (addr, shutdown_tx, ingest_tx, ingest_source)
}

fn seeded_store() -> LongitudinalRecordStore {
    let mut store = LongitudinalRecordStore::new();
    let result = InferenceResult::new(
        7.0,
        0.8,
        "Sustained attention across the window.".to_string(),
        vec!["behavioral_analysis".to_string(), "focused".to_string()],
        ResultDiagnostics::default(),
    );
    let record = LongitudinalRecord::from_session(&result, Vec::new());
    store.append(record, result);
    store
}

#[tokio::test]
async fn test_health_endpoint() {
    let (addr, shutdown_tx, _tx, _source) = start_test_server(LongitudinalRecordStore::new()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert!(body["version"].as_str().is_some());

    let _ = shutdown_tx.send(());
}

#[tokio::test]
async fn test_ingest_endpoint_queues_sample() {
    use neuropath_engine::source::SampleSource;

    let (addr, shutdown_tx, _tx, mut source) =
        start_test_server(LongitudinalRecordStore::new()).await;

    let sample = serde_json::json!({
        "timestamp_ms": 1500,
        "gaze_x": 0.4,
        "gaze_y": 0.6,
        "attention_level": 0.9,
        "affect": "positive",
        "smile_intensity": 0.8,
        "frown_intensity": 0.0,
        "pose_confidence": 0.95
    });

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{}/ingest", addr))
        .json(&sample)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");

    // The sample lands on the channel the session would be draining.
    source.acquire().expect("acquire");
    let received = source.next_sample().expect("sample queued");
    assert_eq!(received.timestamp_ms, 1500);
    assert_eq!(received.attention_level, 0.9);

    let _ = shutdown_tx.send(());
}

#[tokio::test]
async fn test_ingest_rejects_malformed_sample() {
    let (addr, shutdown_tx, _tx, _source) =
        start_test_server(LongitudinalRecordStore::new()).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{}/ingest", addr))
        .header("Content-Type", "application/json")
        .body(r#"{"gaze_x": "not a number"}"#)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_client_error());

    let _ = shutdown_tx.send(());
}

#[tokio::test]
async fn test_records_endpoint_lists_summaries() {
    let (addr, shutdown_tx, _tx, _source) = start_test_server(seeded_store()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{}/records", addr))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let records = body.as_array().expect("array of records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["risk_score"], 7.0);
    assert_eq!(records[0]["sample_count"], 0);

    let _ = shutdown_tx.send(());
}

#[tokio::test]
async fn test_latest_analysis_endpoint() {
    let (addr, shutdown_tx, _tx, _source) = start_test_server(seeded_store()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{}/analysis/latest", addr))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["score"], 7.0);
    assert!(body["behavioral_tags"]
        .as_array()
        .expect("tags")
        .contains(&serde_json::json!("focused")));

    let _ = shutdown_tx.send(());
}

#[tokio::test]
async fn test_latest_analysis_empty_store_is_404() {
    let (addr, shutdown_tx, _tx, _source) =
        start_test_server(LongitudinalRecordStore::new()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{}/analysis/latest", addr))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    let _ = shutdown_tx.send(());
}
