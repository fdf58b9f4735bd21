//! Data preprocessing module
//!
//! Provides:
//! - Target label encoding
//! - Standard scaling of numeric features
//! - Drop-first one-hot encoding of categorical features
//! - The column transformer combining both

mod label_encoder;
mod scaler;
mod encoder;
mod column_transformer;

pub use label_encoder::LabelEncoder;
pub use scaler::StandardScaler;
pub use encoder::OneHotEncoder;
pub use column_transformer::ColumnTransformer;

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column data type as reported by [`FeatureStats`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
    Text,
}

/// Summary statistics of one column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureStats {
    pub name: String,
    pub dtype: ColumnType,
    pub count: usize,
    pub null_count: usize,
    pub unique_count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FeatureStats {
    pub fn new(name: impl Into<String>, dtype: ColumnType) -> Self {
        Self {
            name: name.into(),
            dtype,
            count: 0,
            null_count: 0,
            unique_count: 0,
            mean: None,
            std: None,
            min: None,
            max: None,
        }
    }

    /// Compute statistics from a series, classifying it by dtype.
    ///
    /// Integer columns with few distinct values are reported as categorical.
    pub fn from_series(series: &Series) -> Result<Self> {
        let dtype = series.dtype();
        let unique_count = series.n_unique()?;
        let kind = if dtype.is_float() {
            ColumnType::Numeric
        } else if dtype.is_integer() {
            if unique_count <= 10 {
                ColumnType::Categorical
            } else {
                ColumnType::Numeric
            }
        } else {
            ColumnType::Text
        };

        let mut stats = Self::new(series.name().as_str(), kind);
        stats.count = series.len();
        stats.null_count = series.null_count();
        stats.unique_count = unique_count;

        if dtype.is_float() || dtype.is_integer() {
            let cast = series.cast(&DataType::Float64)?;
            let ca = cast.f64()?;
            stats.mean = ca.mean();
            stats.std = ca.std(1);
            stats.min = ca.min();
            stats.max = ca.max();
        }

        Ok(stats)
    }

    /// Statistics for every column of a frame
    pub fn describe(df: &DataFrame) -> Result<Vec<Self>> {
        df.get_columns()
            .iter()
            .map(|c| Self::from_series(c.as_materialized_series()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let df = df!(
            "Age" => &[40.0, 50.0, 60.0],
            "Sex" => &[0i64, 1, 1],
            "Heart Disease" => &["Absence", "Presence", "Absence"]
        )
        .unwrap();

        let stats = FeatureStats::describe(&df).unwrap();
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].dtype, ColumnType::Numeric);
        assert_eq!(stats[0].mean, Some(50.0));
        assert_eq!(stats[1].dtype, ColumnType::Categorical);
        assert_eq!(stats[1].unique_count, 2);
        assert_eq!(stats[2].dtype, ColumnType::Text);
        assert_eq!(stats[2].mean, None);
    }

    #[test]
    fn test_column_type_serialize() {
        let json = serde_json::to_string(&ColumnType::Numeric).unwrap();
        assert_eq!(json, "\"Numeric\"");
    }
}
