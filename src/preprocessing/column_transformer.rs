//! Column-wise preprocessing: scaled numeric block followed by the
//! one-hot categorical block

use super::{OneHotEncoder, StandardScaler};
use crate::data::{CATEGORICAL_FEATURES, NUMERIC_FEATURES};
use crate::error::{HeartIqError, Result};
use ndarray::{concatenate, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    scaler: StandardScaler,
    encoder: OneHotEncoder,
    is_fitted: bool,
}

impl ColumnTransformer {
    pub fn new(numeric_columns: &[&str], categorical_columns: &[&str]) -> Self {
        Self {
            numeric_columns: numeric_columns.iter().map(|s| s.to_string()).collect(),
            categorical_columns: categorical_columns.iter().map(|s| s.to_string()).collect(),
            scaler: StandardScaler::new(),
            encoder: OneHotEncoder::new(),
            is_fitted: false,
        }
    }

    /// Transformer over the patient schema
    pub fn heart_disease() -> Self {
        Self::new(&NUMERIC_FEATURES, &CATEGORICAL_FEATURES)
    }

    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let numeric: Vec<&str> = self.numeric_columns.iter().map(String::as_str).collect();
        let categorical: Vec<&str> = self.categorical_columns.iter().map(String::as_str).collect();

        self.scaler.fit(df, &numeric)?;
        self.encoder.fit(df, &categorical)?;
        self.is_fitted = true;
        Ok(self)
    }

    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(HeartIqError::ModelNotFitted);
        }

        let numeric = self.scaler.transform(df)?;
        let categorical = self.encoder.transform(df)?;
        Ok(concatenate(Axis(1), &[numeric.view(), categorical.view()])?)
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn n_output_features(&self) -> usize {
        self.numeric_columns.len() + self.encoder.n_output_features()
    }

    /// Names of the transformed columns, in output order
    pub fn output_feature_names(&self) -> Vec<String> {
        self.numeric_columns
            .iter()
            .cloned()
            .chain(self.encoder.feature_names())
            .collect()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{take_rows, PatientRecord};

    fn sample() -> DataFrame {
        let records = vec![
            PatientRecord::default(),
            PatientRecord { age: 60.0, sex: 0, thallium: 7, chest_pain_type: 4, ..Default::default() },
            PatientRecord { age: 40.0, thallium: 6, chest_pain_type: 2, ..Default::default() },
        ];
        PatientRecord::to_dataframe(&records).unwrap()
    }

    #[test]
    fn test_output_layout() {
        let df = sample();
        let mut transformer = ColumnTransformer::heart_disease();
        let out = transformer.fit_transform(&df).unwrap();

        let names = transformer.output_feature_names();
        assert_eq!(out.ncols(), transformer.n_output_features());
        assert_eq!(names.len(), out.ncols());
        assert_eq!(&names[..5], &["Age", "BP", "Cholesterol", "Max HR", "ST depression"]);
        assert!(names.contains(&"Sex_1".to_string()));
        assert!(names.contains(&"Thallium_7".to_string()));
        assert!(!names.contains(&"Thallium_3".to_string()));
    }

    #[test]
    fn test_unseen_category_after_fit() {
        let full = sample();
        let fold = take_rows(&full, &[0, 1]).unwrap();
        let held_out = take_rows(&full, &[2]).unwrap();

        let mut transformer = ColumnTransformer::heart_disease();
        transformer.fit(&fold).unwrap();
        assert_eq!(transformer.scaler().mean("Age"), Some(55.0));
        assert!(matches!(
            transformer.transform(&held_out),
            Err(HeartIqError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_missing_column() {
        let mut transformer = ColumnTransformer::heart_disease();
        transformer.fit(&sample()).unwrap();
        let partial = sample().drop("Thallium").unwrap();
        assert!(matches!(transformer.transform(&partial), Err(HeartIqError::SchemaMismatch(_))));
    }
}
