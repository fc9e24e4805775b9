//! Inference result types.
//!
//! Results are immutable once returned. Diagnostics are a fixed
//! optional-field record rather than an open map, so consumers can depend
//! on stable field names without treating the payload as authoritative.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag attached to every scored result.
pub const TAG_BEHAVIORAL_ANALYSIS: &str = "behavioral_analysis";
/// Tag for windows below the scoring minimum.
pub const TAG_INITIALIZING: &str = "initializing";
/// Tag for gaze stability above the stable band.
pub const TAG_STABLE_GAZE: &str = "stable_gaze";
/// Tag for sustained positive affect.
pub const TAG_POSITIVE_AFFECT: &str = "positive_affect";
/// Tag for sustained attention.
pub const TAG_FOCUSED: &str = "focused";
/// Tag marking a session summary produced without the remote collaborator.
pub const TAG_LOCAL_ANALYSIS: &str = "local_analysis";

/// Internal metrics attached to a result. Non-authoritative; every field is
/// optional and populated only when the producing path computed it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultDiagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gaze_stability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affect_consistency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attention_consistency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_attention: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_smile: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gaze_variance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attention_variance: Option<f64>,
    /// Interval firings skipped because a tick body overran the period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_ticks: Option<u64>,
    /// Contained per-tick faults since the session started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_faults: Option<u64>,
    /// Most recent contained source fault, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_fault: Option<String>,
    /// Why the remote collaborator path fell back, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_failure: Option<String>,
}

/// One inference outcome: a per-tick local score or a merged session summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Composite risk-adjacent score in [0, 10]
    pub score: f64,
    /// Data-quality confidence in [0, 1]
    pub confidence: f64,
    /// Unique identifier for this result
    pub pattern_id: String,
    /// Human-readable summary
    pub explanation: String,
    /// Short descriptive labels; order is irrelevant
    pub behavioral_tags: Vec<String>,
    /// Internal metrics, non-authoritative
    #[serde(default)]
    pub diagnostics: ResultDiagnostics,
}

impl InferenceResult {
    /// Build a result with a fresh pattern id.
    pub fn new(
        score: f64,
        confidence: f64,
        explanation: String,
        behavioral_tags: Vec<String>,
        diagnostics: ResultDiagnostics,
    ) -> Self {
        Self {
            score: score.clamp(0.0, 10.0),
            confidence: confidence.clamp(0.0, 1.0),
            pattern_id: Uuid::new_v4().to_string(),
            explanation,
            behavioral_tags,
            diagnostics,
        }
    }

    /// Whether a tag is present.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.behavioral_tags.iter().any(|t| t == tag)
    }
}

/// Validated payload of the remote pattern-analysis collaborator.
///
/// Wire format is camelCase, matching the analysis endpoint's JSON schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAnalysis {
    pub explanation: String,
    pub behavioral_tags: Vec<String>,
    pub confidence: f64,
}
