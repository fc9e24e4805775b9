//! Local scoring over a window of behavioral samples.
//!
//! All metrics are deterministic functions of the window contents; no
//! timestamps enter the score math. Weights and bands are fixed design
//! constants, not learned parameters.

use crate::core::result::{
    InferenceResult, ResultDiagnostics, TAG_BEHAVIORAL_ANALYSIS, TAG_FOCUSED, TAG_INITIALIZING,
    TAG_POSITIVE_AFFECT, TAG_STABLE_GAZE,
};
use crate::source::types::{Affect, BehavioralSample};
use statrs::statistics::Statistics;

/// Composite weight for gaze stability.
const WEIGHT_GAZE: f64 = 0.4;
/// Composite weight for affect consistency.
const WEIGHT_AFFECT: f64 = 0.3;
/// Composite weight for attention consistency.
const WEIGHT_ATTENTION: f64 = 0.3;

/// Band above which a metric is considered stable/sustained.
const STABLE_BAND: f64 = 0.7;
/// Band above which a metric is considered moderate.
const MODERATE_BAND: f64 = 0.4;

/// Detector confidence below this counts as absent.
const DETECTOR_PRESENCE_THRESHOLD: f64 = 0.1;

/// Confidence when at least one sample carries detector confidence.
const CONFIDENCE_WITH_DETECTOR: f64 = 0.7;
/// Confidence when scoring ran on bare signals only.
const CONFIDENCE_WITHOUT_DETECTOR: f64 = 0.5;
/// Confidence of the insufficient-data placeholder.
const CONFIDENCE_INSUFFICIENT: f64 = 0.3;

/// Deterministic scorer for sample windows.
#[derive(Debug, Clone)]
pub struct LocalScoringEngine {
    min_to_score: usize,
}

impl LocalScoringEngine {
    /// Create a scorer requiring at least `min_to_score` samples.
    pub fn new(min_to_score: usize) -> Self {
        Self {
            min_to_score: min_to_score.max(2),
        }
    }

    /// Minimum window length required before the score math runs.
    pub fn min_to_score(&self) -> usize {
        self.min_to_score
    }

    /// Score a window, or yield the insufficient-data placeholder when the
    /// window is still filling. Total over any input; never fails.
    pub fn evaluate(&self, window: &[BehavioralSample]) -> InferenceResult {
        if window.len() < self.min_to_score {
            return self.insufficient_data(window.len());
        }
        self.score(window)
    }

    /// The fixed placeholder for windows below the scoring minimum.
    pub fn insufficient_data(&self, observed: usize) -> InferenceResult {
        InferenceResult::new(
            0.0,
            CONFIDENCE_INSUFFICIENT,
            format!(
                "Collecting samples ({observed}/{}); not enough data to score yet.",
                self.min_to_score
            ),
            vec![TAG_INITIALIZING.to_string()],
            ResultDiagnostics {
                sample_count: Some(observed),
                ..Default::default()
            },
        )
    }

    fn score(&self, window: &[BehavioralSample]) -> InferenceResult {
        let gaze = gaze_stability(window);
        let affect = affect_consistency(window);
        let attention = attention_consistency(window);

        let composite =
            (10.0 * (WEIGHT_GAZE * gaze + WEIGHT_AFFECT * affect + WEIGHT_ATTENTION * attention))
                .clamp(0.0, 10.0);

        // Confidence reflects data quality, not score certainty.
        let has_detector = window
            .iter()
            .any(|s| s.has_detector_signal(DETECTOR_PRESENCE_THRESHOLD));
        let confidence = if has_detector {
            CONFIDENCE_WITH_DETECTOR
        } else {
            CONFIDENCE_WITHOUT_DETECTOR
        };

        let mut tags = vec![TAG_BEHAVIORAL_ANALYSIS.to_string()];
        if gaze > STABLE_BAND {
            tags.push(TAG_STABLE_GAZE.to_string());
        }
        if affect > STABLE_BAND {
            tags.push(TAG_POSITIVE_AFFECT.to_string());
        }
        if attention > STABLE_BAND {
            tags.push(TAG_FOCUSED.to_string());
        }

        let diagnostics = ResultDiagnostics {
            gaze_stability: Some(gaze),
            affect_consistency: Some(affect),
            attention_consistency: Some(attention),
            sample_count: Some(window.len()),
            ..Default::default()
        };

        InferenceResult::new(
            composite,
            confidence,
            compose_explanation(gaze, affect, attention),
            tags,
            diagnostics,
        )
    }
}

/// `1 - clamp(mean(|dx| + |dy|) / 2, 0, 1)` over consecutive samples.
///
/// 1 is perfectly stable, 0 maximally erratic.
pub fn gaze_stability(window: &[BehavioralSample]) -> f64 {
    if window.len() < 2 {
        return 1.0;
    }
    let mean_delta = window
        .windows(2)
        .map(|pair| (pair[1].gaze_x - pair[0].gaze_x).abs() + (pair[1].gaze_y - pair[0].gaze_y).abs())
        .mean();
    1.0 - (mean_delta / 2.0).clamp(0.0, 1.0)
}

/// Tiered mapping of the positive-affect fraction.
///
/// Rewards sustained rather than incidental positive affect: > 0.7 of the
/// window maps to 1.0, > 0.4 to 0.7, anything else to 0.3.
pub fn affect_consistency(window: &[BehavioralSample]) -> f64 {
    if window.is_empty() {
        return 0.3;
    }
    let positive = window
        .iter()
        .filter(|s| s.affect == Affect::Positive)
        .count();
    let fraction = positive as f64 / window.len() as f64;

    if fraction > 0.7 {
        1.0
    } else if fraction > 0.4 {
        0.7
    } else {
        0.3
    }
}

/// Mean attention level across the window (already normalized).
pub fn attention_consistency(window: &[BehavioralSample]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().map(|s| s.attention_level).mean()
}

/// Template composition from the same threshold bands as the tags.
fn compose_explanation(gaze: f64, affect: f64, attention: f64) -> String {
    let gaze_part = if gaze > STABLE_BAND {
        "High gaze stability while tracking the stimulus"
    } else if gaze > MODERATE_BAND {
        "Moderate gaze stability while tracking the stimulus"
    } else {
        "Variable gaze patterns while tracking the stimulus"
    };

    let affect_part = if affect > STABLE_BAND {
        "consistent positive affect"
    } else if affect > MODERATE_BAND {
        "intermittent positive affect"
    } else {
        "limited positive affect"
    };

    let attention_part = if attention > STABLE_BAND {
        "sustained attention across the window"
    } else if attention > MODERATE_BAND {
        "moderate attention across the window"
    } else {
        "fluctuating attention across the window"
    };

    format!("{gaze_part}, with {affect_part} and {attention_part}.")
}
