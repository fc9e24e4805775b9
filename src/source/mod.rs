//! Sample acquisition for the inference engine.
//!
//! A [`SampleSource`] is the engine's view of whatever acquisition pipeline
//! is in use. The engine acquires it once per session, pulls one sample per
//! tick, and releases it on disposal.

pub mod channel;
pub mod simulated;
pub mod types;

use thiserror::Error;

// Re-export commonly used types
pub use channel::{ingest_channel, ChannelSource, SampleSender};
pub use simulated::{ReplaySource, SimulatedSource};
pub use types::{Affect, BehavioralSample};

/// Errors produced by a sample source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source could not be acquired; the session stays idle.
    #[error("acquisition failed: {0}")]
    Acquisition(String),

    /// No sample was available this tick.
    #[error("no sample available")]
    NoSample,

    /// The source disconnected and will not produce further samples.
    #[error("sample source disconnected")]
    Disconnected,
}

/// A collaborator that produces one behavioral sample per tick.
///
/// `acquire` is called during session start; a failure there is reported
/// synchronously to the caller. `next_sample` faults are contained within
/// the tick that observed them.
pub trait SampleSource: Send {
    /// Acquire the underlying pipeline (camera, channel, simulation).
    fn acquire(&mut self) -> Result<(), SourceError>;

    /// Pull the next sample.
    fn next_sample(&mut self) -> Result<BehavioralSample, SourceError>;

    /// Release the underlying pipeline.
    fn release(&mut self);
}
