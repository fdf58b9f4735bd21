//! Evaluation configuration

use crate::training::{DEFAULT_ARTIFACT_PATH, DEFAULT_DATA_PATH};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the rendered evaluation figure
pub const DEFAULT_REPORT_PATH: &str = "optimized_evaluation_results.svg";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub artifact_path: PathBuf,
    pub data_path: PathBuf,
    /// Figure output; None skips rendering
    pub report_path: Option<PathBuf>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            report_path: Some(PathBuf::from(DEFAULT_REPORT_PATH)),
        }
    }
}

impl EvaluationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_path = path.into();
        self
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_report_path(mut self, path: Option<PathBuf>) -> Self {
        self.report_path = path;
        self
    }
}
