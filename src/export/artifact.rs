//! Persisted model artifact

use crate::error::{HeartIqError, Result};
use crate::training::{ForestParams, HeartDiseasePipeline, TrainingConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Training provenance stored next to the fitted pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Crate version that wrote the artifact
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub best_params: ForestParams,
    /// Mean cross-validated F1 of the winning parameters
    pub best_cv_score: f64,
    pub cv_folds: usize,
    pub test_size: f64,
    pub random_state: u64,
    pub target_column: String,
    pub n_train_samples: usize,
    /// Column names after preprocessing
    pub feature_names: Vec<String>,
}

impl ArtifactMetadata {
    pub fn new(
        best_params: ForestParams,
        best_cv_score: f64,
        config: &TrainingConfig,
        n_train_samples: usize,
        feature_names: Vec<String>,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            best_params,
            best_cv_score,
            cv_folds: config.cv_folds,
            test_size: config.test_size,
            random_state: config.random_state,
            target_column: config.target_column.clone(),
            n_train_samples,
            feature_names,
        }
    }
}

/// Fitted pipeline plus the label mapping needed to decode its output.
///
/// `target_mapping[i]` is the label of class index `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub pipeline: HeartDiseasePipeline,
    pub target_mapping: Vec<String>,
    pub metadata: ArtifactMetadata,
}

impl ModelArtifact {
    pub fn new(pipeline: HeartDiseasePipeline, target_mapping: Vec<String>, metadata: ArtifactMetadata) -> Result<Self> {
        let artifact = Self {
            pipeline,
            target_mapping,
            metadata,
        };
        artifact.check().map_err(HeartIqError::TrainingError)?;
        Ok(artifact)
    }

    /// Structural consistency between the pipeline and the mapping
    fn check(&self) -> std::result::Result<(), String> {
        if self.target_mapping.len() != 2 {
            return Err(format!(
                "expected a two-label mapping, found {:?}",
                self.target_mapping
            ));
        }
        if !self.pipeline.is_fitted() {
            return Err("pipeline is not fitted".to_string());
        }
        if self.pipeline.classifier.n_classes() != self.target_mapping.len() {
            return Err(format!(
                "classifier has {} classes but the mapping has {} labels",
                self.pipeline.classifier.n_classes(),
                self.target_mapping.len()
            ));
        }
        Ok(())
    }

    /// Label of a class index
    pub fn label(&self, class: usize) -> Result<&str> {
        self.target_mapping
            .get(class)
            .map(String::as_str)
            .ok_or(HeartIqError::UnknownClass(class))
    }

    /// Write as JSON through a temporary sibling file, so readers never see
    /// a partially written artifact
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, path)?;

        info!(path = %path.display(), "Saved model artifact");
        Ok(())
    }

    /// Read and validate an artifact
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HeartIqError::ArtifactNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let artifact: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| HeartIqError::ArtifactCorrupt(format!("{}: {}", path.display(), e)))?;
        artifact
            .check()
            .map_err(|reason| HeartIqError::ArtifactCorrupt(format!("{}: {}", path.display(), reason)))?;

        info!(
            path = %path.display(),
            version = %artifact.metadata.version,
            best_params = %artifact.metadata.best_params,
            "Loaded model artifact"
        );
        Ok(artifact)
    }
}

/// Shared read-only handle to a loaded artifact.
///
/// Created once at startup; clones share the same artifact.
#[derive(Debug, Clone)]
pub struct ArtifactHandle(Arc<ModelArtifact>);

impl ArtifactHandle {
    /// Load the artifact at `path`
    pub fn initialize(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self(Arc::new(ModelArtifact::load(path)?)))
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self(Arc::new(artifact))
    }
}

impl Deref for ArtifactHandle {
    type Target = ModelArtifact;

    fn deref(&self) -> &ModelArtifact {
        &self.0
    }
}
