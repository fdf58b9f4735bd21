//! Preprocessor + classifier pipeline

use super::grid_search::ForestParams;
use super::random_forest::RandomForest;
use crate::error::{HeartIqError, Result};
use crate::preprocessing::ColumnTransformer;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column transformer followed by a random forest. Fitting fits both
/// stages on the same rows; prediction applies the fitted transform first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartDiseasePipeline {
    pub preprocessor: ColumnTransformer,
    pub classifier: RandomForest,
}

impl HeartDiseasePipeline {
    pub fn new(preprocessor: ColumnTransformer, classifier: RandomForest) -> Self {
        Self {
            preprocessor,
            classifier,
        }
    }

    /// Unfitted pipeline over the patient schema with the given forest parameters
    pub fn from_params(params: &ForestParams, random_state: u64) -> Self {
        Self::new(ColumnTransformer::heart_disease(), params.build(random_state))
    }

    pub fn fit(&mut self, features: &DataFrame, y: &[usize]) -> Result<&mut Self> {
        if features.height() != y.len() {
            return Err(HeartIqError::ShapeError {
                expected: format!("{} labels", features.height()),
                actual: format!("{} labels", y.len()),
            });
        }
        let x = self.preprocessor.fit_transform(features)?;
        let y = Array1::from_vec(y.to_vec());
        self.classifier.fit(&x, &y)?;
        Ok(self)
    }

    /// Preprocessed feature matrix
    pub fn transform(&self, features: &DataFrame) -> Result<Array2<f64>> {
        self.preprocessor.transform(features)
    }

    pub fn predict_proba(&self, features: &DataFrame) -> Result<Array2<f64>> {
        let x = self.transform(features)?;
        self.classifier.predict_proba(&x)
    }

    pub fn predict(&self, features: &DataFrame) -> Result<Array1<usize>> {
        let x = self.transform(features)?;
        self.classifier.predict(&x)
    }

    /// Forest importances keyed by transformed feature name, largest first
    pub fn feature_importances(&self) -> Vec<(String, f64)> {
        let Some(importances) = self.classifier.feature_importances() else {
            return Vec::new();
        };
        let mut named: Vec<(String, f64)> = self
            .preprocessor
            .output_feature_names()
            .into_iter()
            .zip(importances.iter().copied())
            .collect();
        named.sort_by(|a, b| b.1.total_cmp(&a.1));
        named
    }

    pub fn is_fitted(&self) -> bool {
        self.preprocessor.is_fitted() && self.classifier.is_fitted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PatientRecord;

    fn sample() -> (DataFrame, Vec<usize>) {
        let mut records = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let sick = i % 2 == 1;
            records.push(PatientRecord {
                age: 40.0 + i as f64,
                chest_pain_type: if sick { 4 } else { 1 },
                thallium: if sick { 7 } else { 3 },
                max_hr: if sick { 120.0 } else { 170.0 },
                ..Default::default()
            });
            labels.push(sick as usize);
        }
        (PatientRecord::to_dataframe(&records).unwrap(), labels)
    }

    #[test]
    fn test_fit_predict() {
        let (df, y) = sample();
        let mut pipeline = HeartDiseasePipeline::from_params(&ForestParams::default(), 42);
        pipeline.fit(&df, &y).unwrap();

        assert!(pipeline.is_fitted());
        assert_eq!(pipeline.predict(&df).unwrap().to_vec(), y);
        let proba = pipeline.predict_proba(&df).unwrap();
        assert_eq!(proba.dim(), (20, 2));
    }

    #[test]
    fn test_feature_importances_named() {
        let (df, y) = sample();
        let mut pipeline = HeartDiseasePipeline::from_params(&ForestParams::default(), 42);
        pipeline.fit(&df, &y).unwrap();

        let importances = pipeline.feature_importances();
        assert_eq!(importances.len(), pipeline.preprocessor.n_output_features());
        assert!(importances.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_unfitted_pipeline() {
        let (df, _) = sample();
        let pipeline = HeartDiseasePipeline::from_params(&ForestParams::default(), 42);
        assert!(matches!(pipeline.predict(&df), Err(HeartIqError::ModelNotFitted)));
    }
}
