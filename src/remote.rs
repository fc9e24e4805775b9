//! Client for the remote pattern-analysis collaborator.
//!
//! The engine makes exactly one bounded attempt per session and never
//! blocks local scoring on it; any failure here is turned into a local-only
//! fallback by the result merger. Only aggregate metrics leave the process,
//! never raw sample streams.

use crate::core::merge::SessionAggregates;
use crate::core::result::RemoteAnalysis;
use crate::source::types::BehavioralSample;
use serde::Serialize;
use thiserror::Error;

/// Upper bound on a single analysis call.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Remote analysis configuration.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Analysis endpoint, e.g. `http://127.0.0.1:3000/api/analyze`
    pub url: String,
    /// Optional bearer token
    pub api_key: Option<String>,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Remote analysis error types.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// No collaborator is configured for this session.
    #[error("remote analysis disabled")]
    Disabled,

    /// Configuration error
    #[error("remote config error: {0}")]
    Config(String),

    /// Transport error, including timeouts
    #[error("remote network error: {0}")]
    Network(String),

    /// Endpoint returned a non-success status
    #[error("remote server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Response body could not be parsed into the expected schema
    #[error("malformed analysis payload: {0}")]
    MalformedPayload(String),

    /// Response parsed but a required field was absent or unusable
    #[error("analysis payload missing required field: {0}")]
    MissingField(&'static str),
}

/// Aggregate summary sent to the analysis endpoint.
///
/// Mirrors what the clinician-facing service expects: session-level
/// averages, not raw per-tick samples.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisRequest {
    device_id: String,
    sample_count: usize,
    avg_gaze_x: f64,
    avg_gaze_y: f64,
    avg_attention: f64,
    avg_smile: f64,
    gaze_variance: f64,
    attention_variance: f64,
}

/// HTTP client for the remote analysis collaborator.
pub struct RemoteClient {
    config: RemoteConfig,
    client: reqwest::Client,
    device_id: String,
}

impl RemoteClient {
    /// Create a new client.
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RemoteError::Config(e.to_string()))?;

        // Device ID from hostname + instance, never a subject identity.
        let host = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let device_id = format!("screen-{}-{}", host, &uuid::Uuid::new_v4().to_string()[..8]);

        Ok(Self {
            config,
            client,
            device_id,
        })
    }

    /// Get the device ID.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Analyze a completed session's samples.
    ///
    /// One attempt, bounded by the request timeout. Any failure maps to a
    /// [`RemoteError`] for the merger's fallback path.
    pub async fn analyze(
        &self,
        samples: &[BehavioralSample],
    ) -> Result<RemoteAnalysis, RemoteError> {
        if samples.is_empty() {
            return Err(RemoteError::Config("no samples to analyze".to_string()));
        }

        let aggregates = SessionAggregates::from_samples(samples);
        let request = AnalysisRequest {
            device_id: self.device_id.clone(),
            sample_count: aggregates.sample_count,
            avg_gaze_x: aggregates.mean_gaze_x,
            avg_gaze_y: aggregates.mean_gaze_y,
            avg_attention: aggregates.mean_attention,
            avg_smile: aggregates.mean_smile,
            gaze_variance: aggregates.gaze_variance,
            attention_variance: aggregates.attention_variance,
        };

        let mut builder = self
            .client
            .post(&self.config.url)
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(ref key) = self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(RemoteError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let analysis: RemoteAnalysis = response
            .json()
            .await
            .map_err(|e| RemoteError::MalformedPayload(e.to_string()))?;

        validate(analysis)
    }
}

/// Reject payloads that parsed but cannot drive a merge.
fn validate(analysis: RemoteAnalysis) -> Result<RemoteAnalysis, RemoteError> {
    if analysis.explanation.trim().is_empty() {
        return Err(RemoteError::MissingField("explanation"));
    }
    if !analysis.confidence.is_finite() {
        return Err(RemoteError::MissingField("confidence"));
    }
    Ok(analysis)
}
