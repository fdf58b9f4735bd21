//! Inference engine implementation

use super::Prediction;
use crate::data::PatientRecord;
use crate::error::{HeartIqError, Result};
use crate::export::ArtifactHandle;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Inference statistics snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceStats {
    pub total_predictions: u64,
    pub avg_latency_ms: f64,
    pub error_count: u64,
}

#[derive(Debug, Default)]
struct Counters {
    predictions: AtomicU64,
    latency_us: AtomicU64,
    errors: AtomicU64,
}

/// Runs patient records through a loaded artifact
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    handle: ArtifactHandle,
    counters: Arc<Counters>,
}

impl InferenceEngine {
    pub fn new(handle: ArtifactHandle) -> Self {
        Self {
            handle,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn artifact(&self) -> &ArtifactHandle {
        &self.handle
    }

    /// Predict a single record
    pub fn predict(&self, record: &PatientRecord) -> Result<Prediction> {
        let mut predictions = self.predict_batch(std::slice::from_ref(record))?;
        predictions
            .pop()
            .ok_or_else(|| HeartIqError::ShapeError {
                expected: "1 prediction".to_string(),
                actual: "0 predictions".to_string(),
            })
    }

    /// Predict several records in one pass through the pipeline
    pub fn predict_batch(&self, records: &[PatientRecord]) -> Result<Vec<Prediction>> {
        let start = Instant::now();
        let result = self.run(records);
        let elapsed_us = start.elapsed().as_micros() as u64;

        match &result {
            Ok(predictions) => {
                self.counters
                    .predictions
                    .fetch_add(predictions.len() as u64, Ordering::Relaxed);
                self.counters.latency_us.fetch_add(elapsed_us, Ordering::Relaxed);
                debug!(rows = predictions.len(), elapsed_us, "Predicted batch");
            }
            Err(_) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }

    fn run(&self, records: &[PatientRecord]) -> Result<Vec<Prediction>> {
        let features = PatientRecord::to_dataframe(records)?;
        let pipeline = &self.handle.pipeline;
        let classes = pipeline.predict(&features)?;
        let proba = pipeline.predict_proba(&features)?;

        classes
            .iter()
            .zip(proba.rows())
            .map(|(&class, row)| {
                let probabilities = row.to_vec();
                let confidence = probabilities.iter().copied().fold(0.0, f64::max);
                Ok(Prediction {
                    label: self.handle.label(class)?.to_string(),
                    class_index: class,
                    probabilities,
                    confidence,
                })
            })
            .collect()
    }

    /// Get inference statistics
    pub fn stats(&self) -> InferenceStats {
        let total = self.counters.predictions.load(Ordering::Relaxed);
        let latency_us = self.counters.latency_us.load(Ordering::Relaxed);
        InferenceStats {
            total_predictions: total,
            avg_latency_ms: if total == 0 {
                0.0
            } else {
                latency_us as f64 / total as f64 / 1000.0
            },
            error_count: self.counters.errors.load(Ordering::Relaxed),
        }
    }
}
