//! Longitudinal record store for clinician-facing consumers.
//!
//! An append-only, in-memory ordered list of session summaries plus the
//! most recent merged analysis. Single writer (the orchestration layer);
//! readers only need ordered iteration. JSON save/load is a convenience
//! for the CLI, not a storage design.

use crate::core::result::InferenceResult;
use crate::source::types::BehavioralSample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// One completed session's summary. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongitudinalRecord {
    /// Unique record identifier
    pub id: String,
    /// When the session completed
    pub date: DateTime<Utc>,
    /// Final merged score for the session
    pub risk_score: f64,
    /// Explanation strings, in the order they were produced
    pub observations: Vec<String>,
    /// The full captured sample list for the session
    pub features: Vec<BehavioralSample>,
}

impl LongitudinalRecord {
    /// Create a record from a session's merged result and capture.
    pub fn from_session(result: &InferenceResult, features: Vec<BehavioralSample>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date: Utc::now(),
            risk_score: result.score,
            observations: vec![result.explanation.clone()],
            features,
        }
    }
}

/// Record store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Append-only collection of session records.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LongitudinalRecordStore {
    records: Vec<LongitudinalRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest_analysis: Option<InferenceResult>,
}

impl LongitudinalRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a session record and remember its merged analysis.
    pub fn append(&mut self, record: LongitudinalRecord, analysis: InferenceResult) {
        self.records.push(record);
        self.latest_analysis = Some(analysis);
    }

    /// Ordered read of all records, oldest first.
    pub fn records(&self) -> &[LongitudinalRecord] {
        &self.records
    }

    /// The most recent merged analysis, if any session has completed.
    pub fn latest_analysis(&self) -> Option<&InferenceResult> {
        self.latest_analysis.as_ref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Persist the store as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| StoreError::Parse(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| StoreError::Io(e.to_string()))
    }

    /// Load a previously saved store; a missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| StoreError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::result::ResultDiagnostics;

    fn analysis(score: f64) -> InferenceResult {
        InferenceResult::new(
            score,
            0.5,
            format!("session scored {score}"),
            vec![],
            ResultDiagnostics::default(),
        )
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = LongitudinalRecordStore::new();
        for score in [2.0, 5.0, 8.0] {
            let result = analysis(score);
            store.append(LongitudinalRecord::from_session(&result, vec![]), result);
        }

        let scores: Vec<f64> = store.records().iter().map(|r| r.risk_score).collect();
        assert_eq!(scores, vec![2.0, 5.0, 8.0]);
        assert_eq!(store.latest_analysis().unwrap().score, 8.0);
    }

    #[test]
    fn test_record_carries_explanation() {
        let result = analysis(4.0);
        let record = LongitudinalRecord::from_session(&result, vec![]);
        assert_eq!(record.observations, vec!["session scored 4".to_string()]);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join("neuropath-store-test");
        let path = dir.join("records.json");
        let _ = std::fs::remove_file(&path);

        let mut store = LongitudinalRecordStore::new();
        let result = analysis(6.0);
        store.append(LongitudinalRecord::from_session(&result, vec![]), result);
        store.save(&path).unwrap();

        let loaded = LongitudinalRecordStore::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.records()[0].risk_score, 6.0);
        assert!(loaded.latest_analysis().is_some());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let path = std::env::temp_dir().join("neuropath-store-test-missing.json");
        let _ = std::fs::remove_file(&path);
        let store = LongitudinalRecordStore::load(&path).unwrap();
        assert!(store.is_empty());
    }
}
