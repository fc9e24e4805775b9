//! Integration tests for the continuous inference session lifecycle

use neuropath_engine::config::EngineConfig;
use neuropath_engine::core::result::{
    RemoteAnalysis, TAG_BEHAVIORAL_ANALYSIS, TAG_INITIALIZING, TAG_LOCAL_ANALYSIS,
};
use neuropath_engine::records::LongitudinalRecordStore;
use neuropath_engine::remote::RemoteError;
use neuropath_engine::session::{ContinuousInferenceSession, SessionState};
use neuropath_engine::source::{BehavioralSample, SampleSource, SimulatedSource, SourceError};
use neuropath_engine::InferenceResult;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A source whose sampling blocks longer than the tick period, forcing the
/// interval to skip firings.
struct SlowSource {
    delay: Duration,
    clock_ms: u64,
}

impl SlowSource {
    fn new(delay: Duration) -> Self {
        Self { delay, clock_ms: 0 }
    }
}

impl SampleSource for SlowSource {
    fn acquire(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    fn next_sample(&mut self) -> Result<BehavioralSample, SourceError> {
        std::thread::sleep(self.delay);
        self.clock_ms += self.delay.as_millis() as u64;
        Ok(BehavioralSample::new(self.clock_ms, 0.5, 0.5, 0.5))
    }

    fn release(&mut self) {}
}

fn fast_config() -> EngineConfig {
    EngineConfig {
        capacity: 60,
        min_to_score: 10,
        tick_interval: Duration::from_millis(5),
    }
}

fn collecting_sink() -> (Arc<Mutex<Vec<InferenceResult>>>, impl FnMut(InferenceResult) + Send + 'static) {
    let seen: Arc<Mutex<Vec<InferenceResult>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |r| sink.lock().unwrap().push(r))
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let source = Box::new(SimulatedSource::new(11, 5));
    let mut session = ContinuousInferenceSession::new(fast_config(), source);
    assert_eq!(session.state(), SessionState::Idle);

    let (seen, sink) = collecting_sink();
    assert!(session.start(sink));
    assert_eq!(session.state(), SessionState::Running);

    tokio::time::sleep(Duration::from_millis(250)).await;
    session.stop().await;
    assert_eq!(session.state(), SessionState::Stopped);

    let results = seen.lock().unwrap();
    assert!(results.len() >= 15, "expected a full run, got {} results", results.len());

    // Warm-up ticks produce placeholders until the window has enough data.
    assert!(results[0].has_tag(TAG_INITIALIZING));
    assert_eq!(results[0].score, 0.0);
    assert_eq!(results[0].confidence, 0.3);
    let last = results.last().unwrap();
    assert!(last.has_tag(TAG_BEHAVIORAL_ANALYSIS));
    assert!(last.confidence > 0.3);

    assert_eq!(session.captured_samples().len(), results.len());
    assert!(session.last_result().is_some());
}

#[tokio::test]
async fn test_stop_halts_callbacks_and_restart_begins_fresh() {
    let source = Box::new(SimulatedSource::new(3, 5));
    let mut session = ContinuousInferenceSession::new(fast_config(), source);

    let (seen, sink) = collecting_sink();
    assert!(session.start(sink));
    tokio::time::sleep(Duration::from_millis(200)).await;
    session.stop().await;

    let count_at_stop = seen.lock().unwrap().len();
    assert!(count_at_stop >= 10);

    // No callback fires once stop has returned.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(seen.lock().unwrap().len(), count_at_stop);

    // A restarted session scores from an empty window again.
    let (seen_restart, sink_restart) = collecting_sink();
    assert!(session.start(sink_restart));
    assert_eq!(session.state(), SessionState::Running);
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.stop().await;

    let restarted = seen_restart.lock().unwrap();
    assert!(!restarted.is_empty());
    assert!(restarted[0].has_tag(TAG_INITIALIZING));
}

#[tokio::test]
async fn test_finish_merges_remote_analysis() {
    let source = Box::new(SimulatedSource::new(5, 5));
    let mut session = ContinuousInferenceSession::new(fast_config(), source);

    assert!(session.start(|_| {}));
    tokio::time::sleep(Duration::from_millis(200)).await;
    session.stop().await;

    let remote = RemoteAnalysis {
        explanation: "Consistent engagement with brief distraction episodes.".to_string(),
        behavioral_tags: (0..7).map(|i| format!("tag_{i}")).collect(),
        confidence: 0.9,
    };

    let mut store = LongitudinalRecordStore::new();
    let (result, record) = session
        .finish(Ok(remote), &mut store)
        .await
        .expect("session produced a summary");

    assert_eq!(result.confidence, 0.9);
    assert_eq!(result.score, result.score.round());
    assert_eq!(result.behavioral_tags.len(), 5);
    assert_eq!(result.explanation, "Consistent engagement with brief distraction episodes.");
    assert!(result.diagnostics.sample_count.is_some());

    assert_eq!(store.len(), 1);
    assert_eq!(record.risk_score, result.score);
    assert!(!record.features.is_empty());
    assert!(store.latest_analysis().is_some());
}

#[tokio::test]
async fn test_finish_falls_back_to_local_summary() {
    let source = Box::new(SimulatedSource::new(5, 5));
    let mut session = ContinuousInferenceSession::new(fast_config(), source);

    assert!(session.start(|_| {}));
    tokio::time::sleep(Duration::from_millis(200)).await;

    // finish() stops a running session before merging.
    let mut store = LongitudinalRecordStore::new();
    let (result, _record) = session
        .finish(Err(RemoteError::Network("connection refused".to_string())), &mut store)
        .await
        .expect("session produced a summary");

    assert_eq!(session.state(), SessionState::Stopped);
    assert_eq!(result.confidence, 0.5);
    assert_eq!(result.behavioral_tags[0], TAG_LOCAL_ANALYSIS);
    assert!(result
        .diagnostics
        .remote_failure
        .as_deref()
        .unwrap()
        .contains("connection refused"));
    assert!((0.0..=10.0).contains(&result.score));
}

#[tokio::test]
async fn test_overrunning_ticks_are_counted_as_skipped() {
    // Each sample takes ~5 periods to produce, so most firings are skipped.
    let source = Box::new(SlowSource::new(Duration::from_millis(25)));
    let mut session = ContinuousInferenceSession::new(fast_config(), source);

    assert!(session.start(|_| {}));
    tokio::time::sleep(Duration::from_millis(300)).await;
    session.stop().await;

    let captured = session.captured_samples().len();
    assert!(captured >= 5, "expected several slow ticks, got {captured}");

    let mut store = LongitudinalRecordStore::new();
    let (result, _record) = session
        .finish(Err(RemoteError::Disabled), &mut store)
        .await
        .expect("session produced a summary");

    // The lost firings are surfaced, not silently absorbed.
    let skipped = result.diagnostics.skipped_ticks.expect("skips counted");
    assert!(skipped >= captured as u64, "skipped {skipped} for {captured} samples");
}

#[tokio::test]
async fn test_finish_without_running_returns_none() {
    let source = Box::new(SimulatedSource::new(5, 5));
    let mut session = ContinuousInferenceSession::new(fast_config(), source);

    let mut store = LongitudinalRecordStore::new();
    assert!(session
        .finish(Err(RemoteError::Disabled), &mut store)
        .await
        .is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_dispose_is_terminal() {
    let source = Box::new(SimulatedSource::new(5, 5));
    let mut session = ContinuousInferenceSession::new(fast_config(), source);

    assert!(session.start(|_| {}));
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.dispose().await;
    assert_eq!(session.state(), SessionState::Disposed);

    assert!(!session.start(|_| {}));

    let mut store = LongitudinalRecordStore::new();
    assert!(session
        .finish(Err(RemoteError::Disabled), &mut store)
        .await
        .is_none());

    // dispose again is a no-op
    session.dispose().await;
    assert_eq!(session.state(), SessionState::Disposed);
}
