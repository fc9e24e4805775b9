//! Core inference pipeline.
//!
//! This module contains:
//! - The bounded sliding window over behavioral samples
//! - Deterministic local scoring of a window
//! - Result types shared by the tick loop and the session-end merge
//! - Reconciliation of local metrics with the remote collaborator

pub mod merge;
pub mod result;
pub mod scoring;
pub mod window;

// Re-export commonly used types
pub use merge::{ResultMerger, SessionAggregates};
pub use result::{
    InferenceResult, RemoteAnalysis, ResultDiagnostics, TAG_BEHAVIORAL_ANALYSIS, TAG_FOCUSED,
    TAG_INITIALIZING, TAG_LOCAL_ANALYSIS, TAG_POSITIVE_AFFECT, TAG_STABLE_GAZE,
};
pub use scoring::{affect_consistency, attention_consistency, gaze_stability, LocalScoringEngine};
pub use window::SlidingWindowBuffer;
