//! Dataset module
//!
//! Provides:
//! - The fixed patient schema (13 features + label)
//! - CSV loading with schema validation
//! - Deterministic train/test splitting

mod schema;
mod loader;
mod split;

pub use schema::{
    FeatureKind, FeatureSpec, PatientRecord, CATEGORICAL_FEATURES, FEATURES, NUMERIC_FEATURES,
    TARGET_COLUMN,
};
pub use loader::{Dataset, DatasetLoader};
pub use split::{train_test_split, TrainTestSplit};

use crate::error::{HeartIqError, Result};
use polars::prelude::*;

/// Rows of `df` at the given indices, in the given order
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec("idx".into(), indices.iter().map(|&i| i as IdxSize).collect());
    Ok(df.take(&idx)?)
}

/// Extract a column as `f64` values, failing on absent columns or nulls
pub(crate) fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| HeartIqError::SchemaMismatch(format!("missing column '{}'", name)))?;
    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| HeartIqError::SchemaMismatch(format!("column '{}' is not numeric: {}", name, e)))?;
    let ca = series.f64()?;

    ca.into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                HeartIqError::SchemaMismatch(format!("null or non-numeric value in '{}' at row {}", name, row))
            })
        })
        .collect()
}

/// Extract a column as integer category codes. Fractional values such as
/// `3.7` are rejected rather than truncated onto a valid code.
pub(crate) fn column_i64(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    column_f64(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            if v.fract() == 0.0 && v.abs() <= i64::MAX as f64 {
                Ok(v as i64)
            } else {
                Err(HeartIqError::SchemaMismatch(format!(
                    "non-integer value {} in '{}' at row {}",
                    v, name, row
                )))
            }
        })
        .collect()
}

/// Extract a column as strings (used for the label)
pub(crate) fn column_str(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df
        .column(name)
        .map_err(|_| HeartIqError::SchemaMismatch(format!("missing column '{}'", name)))?;
    let series = column
        .as_materialized_series()
        .cast(&DataType::String)
        .map_err(|e| HeartIqError::SchemaMismatch(format!("column '{}' cannot be read as text: {}", name, e)))?;
    let ca = series.str()?;

    ca.into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.map(|s| s.trim().to_string())
                .ok_or_else(|| HeartIqError::SchemaMismatch(format!("null value in '{}' at row {}", name, row)))
        })
        .collect()
}
