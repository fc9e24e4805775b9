//! Session-end reconciliation of local and remote analysis.
//!
//! The merger never raises: a failed remote call degrades to a
//! deterministic local-only summary with the failure reason recorded in
//! diagnostics.

use crate::core::result::{
    InferenceResult, RemoteAnalysis, ResultDiagnostics, TAG_BEHAVIORAL_ANALYSIS, TAG_LOCAL_ANALYSIS,
};
use crate::remote::RemoteError;
use crate::source::types::BehavioralSample;
use statrs::statistics::Statistics;

/// Weight of the local behavioral score in a merged result.
const LOCAL_SCORE_WEIGHT: f64 = 0.7;
/// Weight of the remote confidence (rescaled to [0, 10]) in a merged result.
const REMOTE_CONFIDENCE_WEIGHT: f64 = 0.3;
/// Maximum number of remote tags carried into a merged result.
const MAX_REMOTE_TAGS: usize = 5;
/// Confidence of the local-only fallback summary.
const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Whole-session aggregate metrics, computed once over the full capture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionAggregates {
    pub sample_count: usize,
    pub mean_gaze_x: f64,
    pub mean_gaze_y: f64,
    pub mean_attention: f64,
    pub mean_smile: f64,
    pub gaze_variance: f64,
    pub attention_variance: f64,
}

impl SessionAggregates {
    pub fn from_samples(samples: &[BehavioralSample]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let gaze_x: Vec<f64> = samples.iter().map(|s| s.gaze_x).collect();
        let attention: Vec<f64> = samples.iter().map(|s| s.attention_level).collect();

        Self {
            sample_count: samples.len(),
            mean_gaze_x: (&gaze_x).mean(),
            mean_gaze_y: samples.iter().map(|s| s.gaze_y).mean(),
            mean_attention: (&attention).mean(),
            mean_smile: samples.iter().map(|s| s.smile_intensity).mean(),
            gaze_variance: gaze_x.population_variance(),
            attention_variance: attention.population_variance(),
        }
    }

    fn into_diagnostics(self) -> ResultDiagnostics {
        ResultDiagnostics {
            sample_count: Some(self.sample_count),
            mean_attention: Some(self.mean_attention),
            mean_smile: Some(self.mean_smile),
            gaze_variance: Some(self.gaze_variance),
            attention_variance: Some(self.attention_variance),
            ..Default::default()
        }
    }
}

/// Combines the last local result with the remote collaborator's outcome.
pub struct ResultMerger;

impl ResultMerger {
    /// Produce the final session result.
    ///
    /// On remote success the local score dominates and the remote text and
    /// tags are carried through; on any remote failure the summary is
    /// synthesized purely from local aggregates.
    pub fn merge(
        local: &InferenceResult,
        aggregates: &SessionAggregates,
        outcome: Result<RemoteAnalysis, RemoteError>,
    ) -> InferenceResult {
        match outcome {
            Ok(remote) => Self::merge_remote(local, aggregates, remote),
            Err(error) => Self::local_fallback(local, aggregates, &error),
        }
    }

    fn merge_remote(
        local: &InferenceResult,
        aggregates: &SessionAggregates,
        remote: RemoteAnalysis,
    ) -> InferenceResult {
        let confidence = remote.confidence.clamp(0.0, 1.0);
        let score = (local.score * LOCAL_SCORE_WEIGHT
            + confidence * 10.0 * REMOTE_CONFIDENCE_WEIGHT)
            .round()
            .clamp(0.0, 10.0);

        let mut tags = remote.behavioral_tags;
        tags.truncate(MAX_REMOTE_TAGS);

        InferenceResult::new(
            score,
            confidence,
            remote.explanation,
            tags,
            aggregates.clone().into_diagnostics(),
        )
    }

    fn local_fallback(
        local: &InferenceResult,
        aggregates: &SessionAggregates,
        error: &RemoteError,
    ) -> InferenceResult {
        let score = (aggregates.mean_attention * 5.0 + aggregates.mean_smile * 5.0).clamp(0.0, 10.0);

        let mut diagnostics = aggregates.clone().into_diagnostics();
        diagnostics.remote_failure = Some(error.to_string());

        let explanation = format!(
            "Local summary of {} samples: {} Remote pattern analysis was unavailable.",
            aggregates.sample_count, local.explanation
        );

        InferenceResult::new(
            score,
            FALLBACK_CONFIDENCE,
            explanation,
            vec![
                TAG_LOCAL_ANALYSIS.to_string(),
                TAG_BEHAVIORAL_ANALYSIS.to_string(),
            ],
            diagnostics,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::result::TAG_LOCAL_ANALYSIS;
    use crate::source::types::Affect;

    fn local_result(score: f64) -> InferenceResult {
        InferenceResult::new(
            score,
            0.7,
            "Steady tracking.".to_string(),
            vec![TAG_BEHAVIORAL_ANALYSIS.to_string()],
            ResultDiagnostics::default(),
        )
    }

    fn session_samples() -> Vec<BehavioralSample> {
        (0..20u64)
            .map(|i| {
                BehavioralSample::new(i * 100, 0.5, 0.5, 0.8)
                    .with_affect(Affect::Positive)
                    .with_expression(0.6, 0.0)
            })
            .collect()
    }

    #[test]
    fn test_merge_with_remote_success() {
        let samples = session_samples();
        let aggregates = SessionAggregates::from_samples(&samples);
        let remote = RemoteAnalysis {
            explanation: "Consistent engagement with the stimulus.".to_string(),
            behavioral_tags: (0..8).map(|i| format!("tag_{i}")).collect(),
            confidence: 0.9,
        };

        let merged = ResultMerger::merge(&local_result(8.0), &aggregates, Ok(remote));

        // round(8.0 * 0.7 + 0.9 * 10 * 0.3) = round(8.3) = 8
        assert_eq!(merged.score, 8.0);
        assert_eq!(merged.confidence, 0.9);
        assert_eq!(merged.behavioral_tags.len(), 5);
        assert_eq!(merged.explanation, "Consistent engagement with the stimulus.");
        assert!(merged.diagnostics.remote_failure.is_none());
    }

    #[test]
    fn test_remote_confidence_clamped() {
        let aggregates = SessionAggregates::from_samples(&session_samples());
        let remote = RemoteAnalysis {
            explanation: "ok".to_string(),
            behavioral_tags: vec![],
            confidence: 1.7,
        };
        let merged = ResultMerger::merge(&local_result(5.0), &aggregates, Ok(remote));
        assert_eq!(merged.confidence, 1.0);
        assert!(merged.score <= 10.0);
    }

    #[test]
    fn test_fallback_on_remote_failure() {
        let samples = session_samples();
        let aggregates = SessionAggregates::from_samples(&samples);

        let merged = ResultMerger::merge(
            &local_result(8.0),
            &aggregates,
            Err(RemoteError::Network("connection refused".to_string())),
        );

        assert!(merged.has_tag(TAG_LOCAL_ANALYSIS));
        assert_eq!(merged.confidence, 0.5);
        // attention 0.8, smile 0.6 -> 0.8*5 + 0.6*5 = 7.0
        assert!((merged.score - 7.0).abs() < 1e-9);
        let reason = merged.diagnostics.remote_failure.unwrap();
        assert!(reason.contains("connection refused"));
    }

    #[test]
    fn test_fallback_score_clamped() {
        let samples: Vec<_> = (0..5u64)
            .map(|i| BehavioralSample::new(i, 0.5, 0.5, 1.0).with_expression(1.0, 0.0))
            .collect();
        let aggregates = SessionAggregates::from_samples(&samples);
        let merged = ResultMerger::merge(
            &local_result(10.0),
            &aggregates,
            Err(RemoteError::MissingField("confidence")),
        );
        assert_eq!(merged.score, 10.0);
    }

    #[test]
    fn test_aggregates_empty_input() {
        let aggregates = SessionAggregates::from_samples(&[]);
        assert_eq!(aggregates.sample_count, 0);
        assert_eq!(aggregates.mean_attention, 0.0);
    }

    #[test]
    fn test_aggregates_values() {
        let samples = vec![
            BehavioralSample::new(0, 0.2, 0.4, 0.6).with_expression(0.0, 0.0),
            BehavioralSample::new(100, 0.4, 0.6, 1.0).with_expression(0.4, 0.0),
        ];
        let aggregates = SessionAggregates::from_samples(&samples);
        assert_eq!(aggregates.sample_count, 2);
        assert!((aggregates.mean_gaze_x - 0.3).abs() < 1e-9);
        assert!((aggregates.mean_gaze_y - 0.5).abs() < 1e-9);
        assert!((aggregates.mean_attention - 0.8).abs() < 1e-9);
        assert!((aggregates.mean_smile - 0.2).abs() < 1e-9);
        assert!((aggregates.gaze_variance - 0.01).abs() < 1e-9);
    }
}
