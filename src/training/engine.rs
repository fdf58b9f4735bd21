//! Training engine: load, encode, split, search, persist

use super::config::TrainingConfig;
use super::grid_search::{CandidateResult, ForestParams, GridSearchCV};
use super::metrics::ModelMetrics;
use crate::data::{train_test_split, Dataset, DatasetLoader};
use crate::error::{HeartIqError, Result};
use crate::export::{ArtifactMetadata, ModelArtifact};
use crate::preprocessing::LabelEncoder;
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

/// Everything a training run produced
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    /// Every grid candidate in grid order
    pub candidates: Vec<CandidateResult>,
    /// Metrics of the refitted model on the held-out partition
    pub holdout: ModelMetrics,
    pub training_time_secs: f64,
}

impl TrainingOutcome {
    pub fn best_params(&self) -> &ForestParams {
        &self.artifact.metadata.best_params
    }

    pub fn best_score(&self) -> f64 {
        self.artifact.metadata.best_cv_score
    }

    pub fn summary(&self) -> TrainingSummary {
        TrainingSummary {
            best_params: self.artifact.metadata.best_params,
            best_cv_score: self.artifact.metadata.best_cv_score,
            holdout: self.holdout.clone(),
            n_candidates: self.candidates.len(),
            training_time_secs: self.training_time_secs,
        }
    }
}

/// Serializable digest of a [`TrainingOutcome`]
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub best_params: ForestParams,
    pub best_cv_score: f64,
    pub holdout: ModelMetrics,
    pub n_candidates: usize,
    pub training_time_secs: f64,
}

/// Main training engine
#[derive(Debug, Clone)]
pub struct TrainEngine {
    config: TrainingConfig,
}

impl TrainEngine {
    /// Create a new training engine
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Load the configured dataset, train, and write the artifact
    pub fn run(&self) -> Result<TrainingOutcome> {
        let dataset = DatasetLoader::new()
            .with_target_column(&self.config.target_column)
            .load(&self.config.data_path)?;
        let outcome = self.fit(&dataset)?;
        outcome.artifact.save(&self.config.artifact_path)?;
        Ok(outcome)
    }

    /// Train on an in-memory dataset without touching the filesystem
    pub fn fit(&self, dataset: &Dataset) -> Result<TrainingOutcome> {
        self.config.validate()?;
        let start = Instant::now();

        let mut encoder = LabelEncoder::new();
        let y = encoder.fit_transform(dataset.labels())?;
        if encoder.n_classes() != 2 {
            return Err(HeartIqError::TrainingError(format!(
                "expected exactly two labels in '{}', found {:?}",
                self.config.target_column,
                encoder.classes()
            )));
        }
        info!(classes = ?encoder.classes(), counts = ?dataset.label_counts(), "Encoded labels");

        let split = train_test_split(dataset.len(), self.config.test_size, self.config.random_state)?;
        let train = dataset.select(&split.train_indices)?;
        let test = dataset.select(&split.test_indices)?;
        let y_train: Vec<usize> = split.train_indices.iter().map(|&i| y[i]).collect();
        let y_test: Vec<usize> = split.test_indices.iter().map(|&i| y[i]).collect();
        info!(train = train.len(), test = test.len(), "Split dataset");

        for class in 0..encoder.n_classes() {
            if !y_train.contains(&class) {
                return Err(HeartIqError::TrainingError(format!(
                    "training partition has no '{}' rows, all of them fell into the test partition",
                    encoder.classes()[class]
                )));
            }
        }

        let search = GridSearchCV::new(self.config.param_grid.clone())
            .with_cv_folds(self.config.cv_folds)
            .with_random_state(self.config.random_state)
            .with_n_jobs(self.config.n_jobs)
            .with_n_classes(encoder.n_classes())
            .fit(train.features(), &y_train)?;

        info!(
            best_params = %search.best_params,
            best_score = search.best_score,
            elapsed_secs = search.elapsed_secs,
            "Best parameters found"
        );
        for candidate in search.top(5) {
            info!(
                rank = candidate.rank,
                params = %candidate.params,
                mean = candidate.cv.mean_score,
                std = candidate.cv.std_score,
                "Top candidate"
            );
        }

        let pipeline = search.best_estimator;
        let proba = pipeline.predict_proba(test.features())?;
        let y_pred = pipeline.predict(test.features())?.to_vec();
        let scores: Vec<f64> = proba.column(1).to_vec();
        let holdout = ModelMetrics::compute(&y_test, &y_pred, &scores)?;
        if holdout.auc_roc.is_none() {
            warn!("Held-out partition contains a single class, AUC undefined");
        }
        info!(f1 = holdout.f1_score, accuracy = holdout.accuracy, "Held-out metrics");

        for (name, importance) in pipeline.feature_importances().iter().take(5) {
            info!(feature = %name, importance = *importance, "Feature importance");
        }

        let metadata = ArtifactMetadata::new(
            search.best_params,
            search.best_score,
            &self.config,
            train.len(),
            pipeline.preprocessor.output_feature_names(),
        );
        let artifact = ModelArtifact::new(pipeline, encoder.classes().to_vec(), metadata)?;

        Ok(TrainingOutcome {
            artifact,
            candidates: search.candidates,
            holdout,
            training_time_secs: start.elapsed().as_secs_f64(),
        })
    }
}
