//! Inference engine module
//!
//! Single-record and batch prediction against a loaded artifact, with
//! class labels decoded through the artifact's stored mapping.

mod engine;

pub use engine::{InferenceEngine, InferenceStats};

use crate::training::metrics::POSITIVE_CLASS;
use serde::{Deserialize, Serialize};

/// Outcome for one patient record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Decoded label, e.g. `Presence`
    pub label: String,
    pub class_index: usize,
    /// Class probabilities indexed by class
    pub probabilities: Vec<f64>,
    /// Largest class probability
    pub confidence: f64,
}

impl Prediction {
    /// Whether the predicted class is the positive (disease) class
    pub fn is_positive(&self) -> bool {
        self.class_index == POSITIVE_CLASS
    }

    /// Confidence as a percentage with two decimals, e.g. `87.00%`
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_percent() {
        let prediction = Prediction {
            label: "Presence".to_string(),
            class_index: 1,
            probabilities: vec![0.13, 0.87],
            confidence: 0.87,
        };
        assert_eq!(prediction.confidence_percent(), "87.00%");
        assert!(prediction.is_positive());
    }
}
