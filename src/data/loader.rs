//! Dataset loading

use super::schema::{PatientRecord, FEATURES, TARGET_COLUMN};
use super::{column_f64, column_i64, column_str, take_rows};
use crate::error::{HeartIqError, Result};
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Labeled patient table: the 13 feature columns plus the textual labels
#[derive(Debug, Clone)]
pub struct Dataset {
    features: DataFrame,
    labels: Vec<String>,
}

impl Dataset {
    /// Build from a feature frame and matching labels
    pub fn new(features: DataFrame, labels: Vec<String>) -> Result<Self> {
        if features.height() != labels.len() {
            return Err(HeartIqError::ShapeError {
                expected: format!("{} labels", features.height()),
                actual: format!("{} labels", labels.len()),
            });
        }
        Ok(Self { features, labels })
    }

    /// Build from typed records
    pub fn from_records(records: &[PatientRecord], labels: Vec<String>) -> Result<Self> {
        Self::new(PatientRecord::to_dataframe(records)?, labels)
    }

    pub fn features(&self) -> &DataFrame {
        &self.features
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Rows at the given indices, in the given order
    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        let features = take_rows(&self.features, indices)?;
        let labels = indices
            .iter()
            .map(|&i| {
                self.labels.get(i).cloned().ok_or_else(|| HeartIqError::ShapeError {
                    expected: format!("index < {}", self.labels.len()),
                    actual: i.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { features, labels })
    }

    /// Count of each distinct label, sorted by label
    pub fn label_counts(&self) -> Vec<(String, usize)> {
        let mut counts = std::collections::BTreeMap::new();
        for label in &self.labels {
            *counts.entry(label.clone()).or_insert(0usize) += 1;
        }
        counts.into_iter().collect()
    }
}

/// CSV loader enforcing the patient schema
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    target_column: String,
    infer_schema_length: usize,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self {
            target_column: TARGET_COLUMN.to_string(),
            infer_schema_length: 1000,
        }
    }

    /// Override the label column name
    pub fn with_target_column(mut self, target: impl Into<String>) -> Self {
        self.target_column = target.into();
        self
    }

    /// Read the raw CSV without schema checks
    pub fn read_csv(&self, path: &Path) -> Result<DataFrame> {
        if !path.exists() {
            return Err(HeartIqError::DatasetNotFound(path.display().to_string()));
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        Ok(df)
    }

    /// Load and validate a labeled dataset
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        let start = Instant::now();
        let raw = self.read_csv(path)?;
        debug!(rows = raw.height(), cols = raw.width(), "Read CSV");

        let dataset = self.from_frame(&raw)?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded dataset"
        );
        Ok(dataset)
    }

    /// Validate a raw frame against the schema and normalise column types
    pub fn from_frame(&self, raw: &DataFrame) -> Result<Dataset> {
        let missing: Vec<&str> = FEATURES
            .iter()
            .map(|f| f.column)
            .chain(std::iter::once(self.target_column.as_str()))
            .filter(|name| raw.column(name).is_err())
            .collect();
        if !missing.is_empty() {
            return Err(HeartIqError::SchemaMismatch(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        let columns: Vec<Column> = FEATURES
            .iter()
            .map(|spec| {
                let column: Column = if spec.is_numeric() {
                    Series::new(spec.column.into(), column_f64(raw, spec.column)?).into()
                } else {
                    Series::new(spec.column.into(), column_i64(raw, spec.column)?).into()
                };
                Ok(column)
            })
            .collect::<Result<Vec<_>>>()?;

        let features = DataFrame::new(columns)?;
        let labels = column_str(raw, &self.target_column)?;
        Dataset::new(features, labels)
    }
}
