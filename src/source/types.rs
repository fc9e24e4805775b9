//! Behavioral sample types consumed by the inference engine.
//!
//! Samples are normalized scalar signals. The engine is detector-agnostic:
//! whatever acquisition pipeline is in use (camera heuristic, simulation,
//! HTTP ingest) produces the same value type.

use serde::{Deserialize, Serialize};

/// Coarse affect classification for a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affect {
    Positive,
    Neutral,
    Negative,
}

/// One timestamped behavioral observation.
///
/// Created once per tick and never mutated. Gaze coordinates, attention,
/// and expression intensities are normalized to [0, 1]; detector
/// confidences are absent when no enhanced detection backend is available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehavioralSample {
    /// Monotonic capture time in milliseconds
    pub timestamp_ms: u64,
    /// Horizontal gaze position, normalized
    pub gaze_x: f64,
    /// Vertical gaze position, normalized
    pub gaze_y: f64,
    /// Attention proxy, normalized
    pub attention_level: f64,
    /// Coarse affect label
    pub affect: Affect,
    /// Smile intensity, normalized
    pub smile_intensity: f64,
    /// Frown intensity, normalized
    pub frown_intensity: f64,
    /// Pose detector confidence, if a detector contributed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pose_confidence: Option<f64>,
    /// Face detector confidence, if a detector contributed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_confidence: Option<f64>,
}

impl BehavioralSample {
    /// Create a sample with neutral affect and no detector confidence.
    pub fn new(timestamp_ms: u64, gaze_x: f64, gaze_y: f64, attention_level: f64) -> Self {
        Self {
            timestamp_ms,
            gaze_x: gaze_x.clamp(0.0, 1.0),
            gaze_y: gaze_y.clamp(0.0, 1.0),
            attention_level: attention_level.clamp(0.0, 1.0),
            affect: Affect::Neutral,
            smile_intensity: 0.0,
            frown_intensity: 0.0,
            pose_confidence: None,
            face_confidence: None,
        }
    }

    /// Set the affect label.
    pub fn with_affect(mut self, affect: Affect) -> Self {
        self.affect = affect;
        self
    }

    /// Set expression intensities.
    pub fn with_expression(mut self, smile: f64, frown: f64) -> Self {
        self.smile_intensity = smile.clamp(0.0, 1.0);
        self.frown_intensity = frown.clamp(0.0, 1.0);
        self
    }

    /// Attach detector confidences.
    pub fn with_detector_confidence(mut self, pose: f64, face: f64) -> Self {
        self.pose_confidence = Some(pose.clamp(0.0, 1.0));
        self.face_confidence = Some(face.clamp(0.0, 1.0));
        self
    }

    /// Whether a detector contributed a confidence above `threshold`.
    pub fn has_detector_signal(&self, threshold: f64) -> bool {
        self.pose_confidence.map(|c| c > threshold).unwrap_or(false)
            || self.face_confidence.map(|c| c > threshold).unwrap_or(false)
    }
}
