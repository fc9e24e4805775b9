//! Continuous inference session: the tick scheduler and state machine.
//!
//! One session owns one window and one sample source. Ticks run on a
//! single spawned task, so samples are appended and scored strictly in
//! arrival order and result callbacks never overlap. The session-end merge
//! is a distinct terminal step: the state machine transitions to `Stopped`
//! before the remote outcome is reconciled, so it can never race the tick
//! loop.

use crate::config::EngineConfig;
use crate::core::merge::{ResultMerger, SessionAggregates};
use crate::core::result::{InferenceResult, RemoteAnalysis};
use crate::core::scoring::LocalScoringEngine;
use crate::core::window::SlidingWindowBuffer;
use crate::records::{LongitudinalRecord, LongitudinalRecordStore};
use crate::remote::RemoteError;
use crate::source::types::BehavioralSample;
use crate::source::{SampleSource, SourceError};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Initializing,
    Running,
    Stopped,
    Disposed,
}

/// Everything the tick loop accumulated, retained for the session-end path.
#[derive(Debug)]
struct SessionCapture {
    samples: Vec<BehavioralSample>,
    last_result: Option<InferenceResult>,
    ticks: u64,
    skipped_ticks: u64,
    tick_faults: u64,
}

/// Driver for one screening session.
pub struct ContinuousInferenceSession {
    config: EngineConfig,
    state: SessionState,
    source: Option<Box<dyn SampleSource>>,
    shutdown: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<(Box<dyn SampleSource>, SessionCapture)>>,
    capture: Option<SessionCapture>,
}

impl ContinuousInferenceSession {
    /// Create a session over a sample source. The source is acquired on
    /// `start`, not here.
    pub fn new(config: EngineConfig, source: Box<dyn SampleSource>) -> Self {
        Self {
            config,
            state: SessionState::Idle,
            source: Some(source),
            shutdown: None,
            handle: None,
            capture: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Start ticking. Returns `false` without side effects when the session
    /// is already running, is disposed, or the source cannot be acquired.
    ///
    /// Must be called within a tokio runtime; the tick loop runs on a
    /// spawned task and delivers results through `on_result` in tick order.
    pub fn start<F>(&mut self, on_result: F) -> bool
    where
        F: FnMut(InferenceResult) + Send + 'static,
    {
        match self.state {
            SessionState::Running => {
                tracing::warn!("session already running; start ignored");
                return false;
            }
            SessionState::Disposed => {
                tracing::warn!("session disposed; start ignored");
                return false;
            }
            SessionState::Idle | SessionState::Initializing | SessionState::Stopped => {}
        }

        let Some(mut source) = self.source.take() else {
            tracing::warn!("no sample source available; start ignored");
            return false;
        };

        self.state = SessionState::Initializing;
        if let Err(e) = source.acquire() {
            tracing::warn!("sample source acquisition failed: {e}");
            self.source = Some(source);
            self.state = SessionState::Idle;
            return false;
        }

        // A restart begins from an empty window and a fresh capture.
        self.capture = None;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let config = self.config.clone();
        self.handle = Some(tokio::spawn(tick_loop(
            config,
            source,
            shutdown_rx,
            on_result,
        )));
        self.shutdown = Some(shutdown_tx);
        self.state = SessionState::Running;
        tracing::info!(
            capacity = self.config.capacity,
            min_to_score = self.config.min_to_score,
            "inference session running"
        );
        true
    }

    /// Stop ticking. After this returns, no further `on_result` fires; the
    /// captured samples and tick counters remain available for the
    /// session-end path.
    pub async fn stop(&mut self) {
        if self.state != SessionState::Running {
            return;
        }

        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.handle.take() {
            match handle.await {
                Ok((source, capture)) => {
                    tracing::info!(
                        ticks = capture.ticks,
                        skipped = capture.skipped_ticks,
                        faults = capture.tick_faults,
                        "inference session stopped"
                    );
                    self.source = Some(source);
                    self.capture = Some(capture);
                }
                Err(e) => {
                    tracing::error!("tick task did not shut down cleanly: {e}");
                }
            }
        }
        self.state = SessionState::Stopped;
    }

    /// Samples captured by the most recent run, in arrival order.
    /// Empty until the session has been stopped.
    pub fn captured_samples(&self) -> &[BehavioralSample] {
        self.capture
            .as_ref()
            .map(|c| c.samples.as_slice())
            .unwrap_or(&[])
    }

    /// The last per-tick result of the most recent run, if any.
    pub fn last_result(&self) -> Option<&InferenceResult> {
        self.capture.as_ref().and_then(|c| c.last_result.as_ref())
    }

    /// Session-end path: reconcile the remote outcome with local metrics,
    /// append the record to the store, and return both.
    ///
    /// Stops the session first if it is still running, so the merge never
    /// runs concurrently with ticking. Returns `None` when there is nothing
    /// to summarize (never ran, or already finished/disposed).
    pub async fn finish(
        &mut self,
        outcome: Result<RemoteAnalysis, RemoteError>,
        store: &mut LongitudinalRecordStore,
    ) -> Option<(InferenceResult, LongitudinalRecord)> {
        if self.state == SessionState::Running {
            self.stop().await;
        }
        if self.state == SessionState::Disposed {
            return None;
        }

        let capture = self.capture.take()?;
        let aggregates = SessionAggregates::from_samples(&capture.samples);
        let local = capture.last_result.unwrap_or_else(|| {
            LocalScoringEngine::new(self.config.min_to_score)
                .insufficient_data(capture.samples.len())
        });

        let mut merged = ResultMerger::merge(&local, &aggregates, outcome);
        if capture.skipped_ticks > 0 {
            merged.diagnostics.skipped_ticks = Some(capture.skipped_ticks);
        }
        if capture.tick_faults > 0 {
            merged.diagnostics.tick_faults = Some(capture.tick_faults);
        }

        let record = LongitudinalRecord::from_session(&merged, capture.samples);
        store.append(record.clone(), merged.clone());
        Some((merged, record))
    }

    /// Release the sample source and window. Terminal; the session cannot
    /// be restarted afterwards.
    pub async fn dispose(&mut self) {
        if self.state == SessionState::Running {
            self.stop().await;
        }
        if let Some(mut source) = self.source.take() {
            source.release();
        }
        self.capture = None;
        self.state = SessionState::Disposed;
        tracing::info!("inference session disposed");
    }
}

/// The tick loop. Runs until shutdown is signalled, then hands the source
/// and the accumulated capture back to the session.
async fn tick_loop<F>(
    config: EngineConfig,
    mut source: Box<dyn SampleSource>,
    mut shutdown_rx: watch::Receiver<bool>,
    mut on_result: F,
) -> (Box<dyn SampleSource>, SessionCapture)
where
    F: FnMut(InferenceResult) + Send + 'static,
{
    let engine = LocalScoringEngine::new(config.min_to_score);
    let mut window = SlidingWindowBuffer::new(config.capacity);
    let mut capture = SessionCapture {
        samples: Vec::new(),
        last_result: None,
        ticks: 0,
        skipped_ticks: 0,
        tick_faults: 0,
    };
    let mut pending_fault: Option<String> = None;
    let mut last_tick_at: Option<tokio::time::Instant> = None;

    let mut clock = tokio::time::interval(config.tick_interval);
    // Skipped ticks are accepted data loss; nothing is queued or replayed.
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            now = clock.tick() => {
                // Ticks are serialized on this task; a tick body that
                // overruns the period makes the interval skip firings.
                // Recover the skip count from the gap between tick instants.
                if let Some(prev) = last_tick_at {
                    let gap = now.duration_since(prev).as_secs_f64()
                        / config.tick_interval.as_secs_f64();
                    capture.skipped_ticks += (gap.round() as u64).saturating_sub(1);
                }
                last_tick_at = Some(now);
                capture.ticks += 1;

                match source.next_sample() {
                    Ok(sample) => {
                        window.append(sample.clone());
                        capture.samples.push(sample);

                        let mut result = engine.evaluate(window.latest(config.min_to_score));
                        if capture.skipped_ticks > 0 {
                            result.diagnostics.skipped_ticks = Some(capture.skipped_ticks);
                        }
                        if capture.tick_faults > 0 {
                            result.diagnostics.tick_faults = Some(capture.tick_faults);
                        }
                        result.diagnostics.source_fault = pending_fault.take();

                        capture.last_result = Some(result.clone());
                        on_result(result);
                    }
                    Err(SourceError::NoSample) => {
                        // Idle tick; the source simply had nothing yet.
                        tracing::debug!("tick produced no sample");
                    }
                    Err(e) => {
                        capture.tick_faults += 1;
                        pending_fault = Some(e.to_string());
                        tracing::warn!("tick fault contained: {e}");
                    }
                }
            }
        }
    }

    (source, capture)
}
