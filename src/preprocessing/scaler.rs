//! Standard scaling of numeric columns

use crate::data::column_f64;
use crate::error::{HeartIqError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Fitted centre and scale of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    column: String,
    mean: f64,
    scale: f64,
}

/// Z-score scaler: `(x - mean) / std` with the population standard
/// deviation. Columns with zero deviation are only centred.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the scaler to the given columns of `df`
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        if df.height() == 0 {
            return Err(HeartIqError::TrainingError("cannot fit scaler on empty data".to_string()));
        }

        self.params = columns
            .iter()
            .map(|&name| {
                let values = column_f64(df, name)?;
                let n = values.len() as f64;
                let mean = values.iter().sum::<f64>() / n;
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                Ok(ScalerParams {
                    column: name.to_string(),
                    mean,
                    scale: if std == 0.0 { 1.0 } else { std },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Scaled values, one output column per fitted column, in fit order
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(HeartIqError::ModelNotFitted);
        }

        let mut out = Array2::zeros((df.height(), self.params.len()));
        for (j, params) in self.params.iter().enumerate() {
            let values = column_f64(df, &params.column)?;
            for (i, v) in values.into_iter().enumerate() {
                out[[i, j]] = (v - params.mean) / params.scale;
            }
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<Array2<f64>> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn columns(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.column.as_str()).collect()
    }

    pub fn mean(&self, column: &str) -> Option<f64> {
        self.params.iter().find(|p| p.column == column).map(|p| p.mean)
    }

    pub fn scale(&self, column: &str) -> Option<f64> {
        self.params.iter().find(|p| p.column == column).map(|p| p.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_std() {
        let df = df!("x" => &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut scaler = StandardScaler::new();
        let out = scaler.fit_transform(&df, &["x"]).unwrap();

        assert_eq!(scaler.mean("x"), Some(2.5));
        assert!((scaler.scale("x").unwrap() - 1.25f64.sqrt()).abs() < 1e-12);
        let mean: f64 = out.column(0).sum() / 4.0;
        let var: f64 = out.column(0).iter().map(|v| v * v).sum::<f64>() / 4.0;
        assert!(mean.abs() < 1e-12);
        assert!((var - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column() {
        let df = df!("x" => &[5.0, 5.0, 5.0]).unwrap();
        let mut scaler = StandardScaler::new();
        let out = scaler.fit_transform(&df, &["x"]).unwrap();
        assert!(out.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_missing_column_at_transform() {
        let train = df!("x" => &[1.0, 2.0]).unwrap();
        let other = df!("y" => &[1.0, 2.0]).unwrap();
        let mut scaler = StandardScaler::new();
        scaler.fit(&train, &["x"]).unwrap();
        assert!(matches!(scaler.transform(&other), Err(HeartIqError::SchemaMismatch(_))));
    }

    #[test]
    fn test_not_fitted() {
        let df = df!("x" => &[1.0]).unwrap();
        assert!(matches!(StandardScaler::new().transform(&df), Err(HeartIqError::ModelNotFitted)));
    }
}
