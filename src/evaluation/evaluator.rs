//! Hold-out evaluation of a persisted artifact

use super::EvaluationConfig;
use crate::data::{train_test_split, Dataset, DatasetLoader};
use crate::error::{HeartIqError, Result};
use crate::export::ModelArtifact;
use crate::preprocessing::LabelEncoder;
use crate::training::metrics::{confusion_matrix, f1_score, roc_curve};
use crate::training::{ClassificationReport, RocCurve};
use crate::visualization::render_evaluation;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Metrics of an artifact on its held-out partition
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub labels: Vec<String>,
    pub f1_score: f64,
    pub auc_roc: f64,
    pub accuracy: f64,
    /// Rows are true classes, columns predicted classes
    pub confusion_matrix: Vec<Vec<usize>>,
    pub classification_report: ClassificationReport,
    pub roc_curve: RocCurve,
    pub n_test: usize,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Optimized Model Evaluation ---")?;
        writeln!(f, "F1 Score: {:.4}", self.f1_score)?;
        writeln!(f, "AUC-ROC Score: {:.4}", self.auc_roc)?;
        writeln!(f)?;
        writeln!(f, "Detailed Classification Report:")?;
        write!(f, "{}", self.classification_report)
    }
}

/// Replays the training split and scores the artifact on the test rows
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: EvaluationConfig,
}

impl Evaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    /// Load artifact and dataset, evaluate, and render the figure if configured
    pub fn run(&self) -> Result<EvaluationReport> {
        let artifact = ModelArtifact::load(&self.config.artifact_path)?;
        let dataset = DatasetLoader::new()
            .with_target_column(&artifact.metadata.target_column)
            .load(&self.config.data_path)?;

        let report = Self::evaluate(&artifact, &dataset)?;
        info!(f1 = report.f1_score, auc = report.auc_roc, n_test = report.n_test, "Evaluated artifact");

        if let Some(path) = &self.config.report_path {
            render_evaluation(path, &report)?;
            info!(path = %path.display(), "Saved evaluation figure");
        }
        Ok(report)
    }

    /// Evaluate on the test partition defined by the artifact's split settings.
    ///
    /// Labels are encoded with the artifact's stored mapping, so a dataset
    /// whose label set differs is rejected instead of silently re-mapped.
    pub fn evaluate(artifact: &ModelArtifact, dataset: &Dataset) -> Result<EvaluationReport> {
        let encoder = LabelEncoder::from_classes(artifact.target_mapping.clone())?;
        let y = encoder.transform(dataset.labels())?;

        let split = train_test_split(dataset.len(), artifact.metadata.test_size, artifact.metadata.random_state)?;
        let test = dataset.select(&split.test_indices)?;
        let y_test: Vec<usize> = split.test_indices.iter().map(|&i| y[i]).collect();

        let pipeline = &artifact.pipeline;
        let y_pred = pipeline.predict(test.features())?.to_vec();
        let proba = pipeline.predict_proba(test.features())?;
        if proba.ncols() < 2 {
            return Err(HeartIqError::ShapeError {
                expected: "2 probability columns".to_string(),
                actual: format!("{} probability columns", proba.ncols()),
            });
        }
        let scores = proba.column(1).to_vec();

        let labels = artifact.target_mapping.clone();
        let cm = confusion_matrix(&y_test, &y_pred, labels.len())?;
        let curve = roc_curve(&y_test, &scores)?;
        let classification_report = ClassificationReport::new(&y_test, &y_pred, &labels)?;

        Ok(EvaluationReport {
            f1_score: f1_score(&y_test, &y_pred)?,
            auc_roc: curve.auc(),
            accuracy: classification_report.accuracy,
            confusion_matrix: cm.outer_iter().map(|row| row.to_vec()).collect(),
            classification_report,
            roc_curve: curve,
            n_test: y_test.len(),
            labels,
        })
    }
}
