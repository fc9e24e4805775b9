//! NeuroPath Engine - Streaming behavioral signal inference for attention screening.
//!
//! This library turns a stream of per-frame behavioral observations (gaze,
//! attention, affect) into bounded-window attention scores, reconciles them
//! with an optional remote analysis service, and keeps a longitudinal record
//! of screening sessions.
//!
//! # Screening Guarantees
//!
//! - **Screening only**: Scores indicate whether a fuller professional
//!   evaluation may be worthwhile; they are never a diagnosis
//! - **Local first**: Every session produces a usable result with no network
//! - **Bounded memory**: The scoring window holds at most a fixed number of
//!   samples regardless of session length
//! - **Deterministic scoring**: The same window always yields the same score
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       NeuroPath Engine                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌─────────────┐   ┌──────────────┐        │
//! │  │   Source   │──▶│   Sliding   │──▶│    Local     │        │
//! │  │ (samples)  │   │   Window    │   │   Scoring    │        │
//! │  └────────────┘   └─────────────┘   └──────────────┘        │
//! │        │                                    │               │
//! │        ▼                                    ▼               │
//! │  ┌────────────┐   ┌─────────────┐   ┌──────────────┐        │
//! │  │  Session   │──▶│   Result    │◀──│    Remote    │        │
//! │  │ (tick loop)│   │   Merger    │   │   Analysis   │        │
//! │  └────────────┘   └─────────────┘   └──────────────┘        │
//! │                          │                                  │
//! │                          ▼                                  │
//! │                 ┌─────────────────┐                         │
//! │                 │  Record  Store  │                         │
//! │                 └─────────────────┘                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use neuropath_engine::config::EngineConfig;
//! use neuropath_engine::session::ContinuousInferenceSession;
//! use neuropath_engine::source::SimulatedSource;
//!
//! # async fn demo() {
//! let source = Box::new(SimulatedSource::new(42, 100));
//! let mut session = ContinuousInferenceSession::new(EngineConfig::default(), source);
//!
//! session.start(|result| {
//!     println!("score {:.1} ({})", result.score, result.explanation);
//! });
//! # session.stop().await;
//! # }
//! ```

pub mod config;
pub mod core;
pub mod records;
pub mod remote;
pub mod server;
pub mod session;
pub mod source;

// Re-export key types at crate root for convenience
pub use config::{Config, EngineConfig};
pub use core::{
    InferenceResult, LocalScoringEngine, RemoteAnalysis, ResultDiagnostics, ResultMerger,
    SessionAggregates, SlidingWindowBuffer,
};
pub use records::{LongitudinalRecord, LongitudinalRecordStore};
pub use remote::{RemoteClient, RemoteConfig, RemoteError};
pub use session::{ContinuousInferenceSession, SessionState};
pub use source::{Affect, BehavioralSample, ChannelSource, ReplaySource, SampleSource, SimulatedSource};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Screening disclaimer that can be displayed to users.
pub const SCREENING_DISCLAIMER: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║            NEUROPATH ENGINE - SCREENING DISCLAIMER               ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  This tool produces behavioral screening scores for research.    ║
║                                                                  ║
║  ✓ WHAT THE SCORES MEAN:                                         ║
║    • A summary of gaze, affect, and attention patterns           ║
║      observed during a short interactive session                 ║
║    • An indication that a professional evaluation may be         ║
║      worth pursuing                                              ║
║                                                                  ║
║  ✗ WHAT THE SCORES ARE NOT:                                      ║
║    • A medical or psychological diagnosis                        ║
║    • A substitute for evaluation by a qualified clinician        ║
║    • A measure of a child's ability or potential                 ║
║                                                                  ║
║  Scores are computed locally. When a remote analysis service     ║
║  is configured, only aggregate session statistics are sent,      ║
║  never raw video or imagery.                                     ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
