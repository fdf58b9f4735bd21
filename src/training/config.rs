//! Training configuration

use super::grid_search::ParamGrid;
use crate::data::TARGET_COLUMN;
use crate::error::{HeartIqError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default dataset location
pub const DEFAULT_DATA_PATH: &str = "Heart_Disease_Prediction.csv";

/// Default artifact location
pub const DEFAULT_ARTIFACT_PATH: &str = "heart_disease_rf_optimized.json";

/// Configuration for a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Labelled CSV dataset
    pub data_path: PathBuf,
    /// Where the fitted artifact is written
    pub artifact_path: PathBuf,
    /// Label column
    pub target_column: String,
    /// Fraction of rows held out for testing
    pub test_size: f64,
    /// Seed for the split, the folds and the forests
    pub random_state: u64,
    /// Number of stratified folds
    pub cv_folds: usize,
    /// Hyperparameter candidates
    pub param_grid: ParamGrid,
    /// Worker threads for the search (None = all cores)
    pub n_jobs: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            target_column: TARGET_COLUMN.to_string(),
            test_size: 0.2,
            random_state: 42,
            cv_folds: 5,
            param_grid: ParamGrid::default(),
            n_jobs: None,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_path = path.into();
        self
    }

    pub fn with_target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = column.into();
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    pub fn with_param_grid(mut self, grid: ParamGrid) -> Self {
        self.param_grid = grid;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: Option<usize>) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(HeartIqError::InvalidParameter {
                name: "test_size".to_string(),
                value: self.test_size.to_string(),
                reason: "must be in (0, 1)".to_string(),
            });
        }
        if self.cv_folds < 2 {
            return Err(HeartIqError::InvalidParameter {
                name: "cv_folds".to_string(),
                value: self.cv_folds.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        self.param_grid.validate()
    }
}
