//! Patient record schema
//!
//! The 13 clinical features, their CSV column names, and the value domains
//! accepted by the prediction form. Column names must match the training
//! dataset header exactly.

use crate::error::{HeartIqError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Label column of the training dataset
pub const TARGET_COLUMN: &str = "Heart Disease";

/// Numeric features, standardized before training
pub const NUMERIC_FEATURES: [&str; 5] = ["Age", "BP", "Cholesterol", "Max HR", "ST depression"];

/// Categorical features, one-hot encoded before training
pub const CATEGORICAL_FEATURES: [&str; 8] = [
    "Sex",
    "Chest pain type",
    "FBS over 120",
    "EKG results",
    "Exercise angina",
    "Slope of ST",
    "Number of vessels fluro",
    "Thallium",
];

/// Kind and admissible values of a feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureKind {
    /// Continuous value within `[min, max]`
    Numeric {
        min: f64,
        max: f64,
        default: f64,
        step: f64,
    },
    /// Integer code from a fixed domain
    Categorical {
        domain: &'static [i64],
        default: i64,
    },
}

/// Description of one input feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSpec {
    /// Column name in the dataset
    pub column: &'static str,
    /// Field name in the HTML form
    pub form_name: &'static str,
    /// Human readable label
    pub label: &'static str,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, FeatureKind::Numeric { .. })
    }

    /// Look up a feature by its dataset column name
    pub fn by_column(column: &str) -> Option<&'static FeatureSpec> {
        FEATURES.iter().find(|f| f.column == column)
    }

    /// Check a numeric value against the documented range
    pub fn check_numeric(&self, value: f64) -> Result<()> {
        match self.kind {
            FeatureKind::Numeric { min, max, .. } => {
                if !value.is_finite() || value < min || value > max {
                    return Err(HeartIqError::ValidationError(format!(
                        "{} must be between {} and {}, got {}",
                        self.column, min, max, value
                    )));
                }
                Ok(())
            }
            FeatureKind::Categorical { .. } => Err(HeartIqError::SchemaMismatch(format!(
                "{} is categorical",
                self.column
            ))),
        }
    }

    /// Check a categorical code against the enumerated domain
    pub fn check_categorical(&self, value: i64) -> Result<()> {
        match self.kind {
            FeatureKind::Categorical { domain, .. } => {
                if !domain.contains(&value) {
                    return Err(HeartIqError::ValidationError(format!(
                        "{} must be one of {:?}, got {}",
                        self.column, domain, value
                    )));
                }
                Ok(())
            }
            FeatureKind::Numeric { .. } => Err(HeartIqError::SchemaMismatch(format!(
                "{} is numeric",
                self.column
            ))),
        }
    }
}

/// All features in dataset column order
pub static FEATURES: [FeatureSpec; 13] = [
    FeatureSpec {
        column: "Age",
        form_name: "age",
        label: "Age of Patient",
        kind: FeatureKind::Numeric { min: 1.0, max: 100.0, default: 50.0, step: 1.0 },
    },
    FeatureSpec {
        column: "Sex",
        form_name: "sex",
        label: "Sex (1 = Male, 0 = Female)",
        kind: FeatureKind::Categorical { domain: &[1, 0], default: 1 },
    },
    FeatureSpec {
        column: "Chest pain type",
        form_name: "chest_pain_type",
        label: "Chest Pain Type (1; 2; 3; 4)",
        kind: FeatureKind::Categorical { domain: &[1, 2, 3, 4], default: 1 },
    },
    FeatureSpec {
        column: "BP",
        form_name: "bp",
        label: "Resting Blood Pressure (BP)",
        kind: FeatureKind::Numeric { min: 80.0, max: 200.0, default: 120.0, step: 1.0 },
    },
    FeatureSpec {
        column: "Cholesterol",
        form_name: "cholesterol",
        label: "Serum Cholesterol",
        kind: FeatureKind::Numeric { min: 100.0, max: 600.0, default: 200.0, step: 1.0 },
    },
    FeatureSpec {
        column: "FBS over 120",
        form_name: "fbs_over_120",
        label: "Fasting Blood Sugar > 120 mg/dl (1 = True, 0 = False)",
        kind: FeatureKind::Categorical { domain: &[0, 1], default: 0 },
    },
    FeatureSpec {
        column: "EKG results",
        form_name: "ekg_results",
        label: "EKG Results (0; 1; 2)",
        kind: FeatureKind::Categorical { domain: &[0, 1, 2], default: 0 },
    },
    FeatureSpec {
        column: "Max HR",
        form_name: "max_hr",
        label: "Max Heart Rate (Max HR)",
        kind: FeatureKind::Numeric { min: 60.0, max: 220.0, default: 150.0, step: 1.0 },
    },
    FeatureSpec {
        column: "Exercise angina",
        form_name: "exercise_angina",
        label: "Exercise Induced Angina (1 = Yes, 0 = No)",
        kind: FeatureKind::Categorical { domain: &[0, 1], default: 0 },
    },
    FeatureSpec {
        column: "ST depression",
        form_name: "st_depression",
        label: "ST Depression value (mm)",
        kind: FeatureKind::Numeric { min: 0.0, max: 6.2, default: 1.0, step: 0.1 },
    },
    FeatureSpec {
        column: "Slope of ST",
        form_name: "slope_of_st",
        label: "Slope of ST Segment",
        kind: FeatureKind::Categorical { domain: &[1, 2, 3], default: 1 },
    },
    FeatureSpec {
        column: "Number of vessels fluro",
        form_name: "vessels_fluro",
        label: "Number of Major Vessels (0-3)",
        kind: FeatureKind::Categorical { domain: &[0, 1, 2, 3], default: 0 },
    },
    FeatureSpec {
        column: "Thallium",
        form_name: "thallium",
        label: "Thallium (3 = Normal, 6 = Fixed, 7 = Reversible)",
        kind: FeatureKind::Categorical { domain: &[3, 6, 7], default: 3 },
    },
];

/// One patient's clinical features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Sex")]
    pub sex: i64,
    #[serde(rename = "Chest pain type")]
    pub chest_pain_type: i64,
    #[serde(rename = "BP")]
    pub bp: f64,
    #[serde(rename = "Cholesterol")]
    pub cholesterol: f64,
    #[serde(rename = "FBS over 120")]
    pub fbs_over_120: i64,
    #[serde(rename = "EKG results")]
    pub ekg_results: i64,
    #[serde(rename = "Max HR")]
    pub max_hr: f64,
    #[serde(rename = "Exercise angina")]
    pub exercise_angina: i64,
    #[serde(rename = "ST depression")]
    pub st_depression: f64,
    #[serde(rename = "Slope of ST")]
    pub slope_of_st: i64,
    #[serde(rename = "Number of vessels fluro")]
    pub vessels_fluro: i64,
    #[serde(rename = "Thallium")]
    pub thallium: i64,
}

impl Default for PatientRecord {
    /// The form defaults
    fn default() -> Self {
        Self {
            age: 50.0,
            sex: 1,
            chest_pain_type: 1,
            bp: 120.0,
            cholesterol: 200.0,
            fbs_over_120: 0,
            ekg_results: 0,
            max_hr: 150.0,
            exercise_angina: 0,
            st_depression: 1.0,
            slope_of_st: 1,
            vessels_fluro: 0,
            thallium: 3,
        }
    }
}

impl PatientRecord {
    /// Numeric feature value by column name
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            "Age" => Some(self.age),
            "BP" => Some(self.bp),
            "Cholesterol" => Some(self.cholesterol),
            "Max HR" => Some(self.max_hr),
            "ST depression" => Some(self.st_depression),
            _ => None,
        }
    }

    /// Categorical feature code by column name
    pub fn categorical(&self, column: &str) -> Option<i64> {
        match column {
            "Sex" => Some(self.sex),
            "Chest pain type" => Some(self.chest_pain_type),
            "FBS over 120" => Some(self.fbs_over_120),
            "EKG results" => Some(self.ekg_results),
            "Exercise angina" => Some(self.exercise_angina),
            "Slope of ST" => Some(self.slope_of_st),
            "Number of vessels fluro" => Some(self.vessels_fluro),
            "Thallium" => Some(self.thallium),
            _ => None,
        }
    }

    /// Set a feature from its dataset column name
    pub fn set(&mut self, column: &str, value: f64) -> Result<()> {
        match column {
            "Age" => self.age = value,
            "BP" => self.bp = value,
            "Cholesterol" => self.cholesterol = value,
            "Max HR" => self.max_hr = value,
            "ST depression" => self.st_depression = value,
            "Sex" => self.sex = value as i64,
            "Chest pain type" => self.chest_pain_type = value as i64,
            "FBS over 120" => self.fbs_over_120 = value as i64,
            "EKG results" => self.ekg_results = value as i64,
            "Exercise angina" => self.exercise_angina = value as i64,
            "Slope of ST" => self.slope_of_st = value as i64,
            "Number of vessels fluro" => self.vessels_fluro = value as i64,
            "Thallium" => self.thallium = value as i64,
            other => return Err(HeartIqError::SchemaMismatch(format!("unknown feature '{}'", other))),
        }
        Ok(())
    }

    /// Check every field against the documented ranges and domains
    pub fn validate(&self) -> Result<()> {
        for spec in FEATURES.iter() {
            match spec.kind {
                FeatureKind::Numeric { .. } => {
                    let value = self.numeric(spec.column).unwrap_or(f64::NAN);
                    spec.check_numeric(value)?;
                }
                FeatureKind::Categorical { .. } => {
                    let value = self.categorical(spec.column).unwrap_or(i64::MIN);
                    spec.check_categorical(value)?;
                }
            }
        }
        Ok(())
    }

    /// Build a feature frame with one row per record, columns in dataset order
    pub fn to_dataframe(records: &[PatientRecord]) -> Result<DataFrame> {
        let columns: Vec<Column> = FEATURES
            .iter()
            .map(|spec| match spec.kind {
                FeatureKind::Numeric { .. } => {
                    let values: Vec<f64> = records
                        .iter()
                        .map(|r| r.numeric(spec.column).unwrap_or(f64::NAN))
                        .collect();
                    Series::new(spec.column.into(), values).into()
                }
                FeatureKind::Categorical { .. } => {
                    let values: Vec<i64> = records
                        .iter()
                        .map(|r| r.categorical(spec.column).unwrap_or_default())
                        .collect();
                    Series::new(spec.column.into(), values).into()
                }
            })
            .collect();

        Ok(DataFrame::new(columns)?)
    }

    /// Read every row of a feature frame back into records, extracting
    /// each column once
    pub fn from_dataframe(df: &DataFrame) -> Result<Vec<Self>> {
        let mut records = vec![Self::default(); df.height()];
        for spec in FEATURES.iter() {
            let values: Vec<f64> = match spec.kind {
                FeatureKind::Numeric { .. } => super::column_f64(df, spec.column)?,
                FeatureKind::Categorical { .. } => super::column_i64(df, spec.column)?
                    .into_iter()
                    .map(|v| v as f64)
                    .collect(),
            };
            for (record, value) in records.iter_mut().zip(values) {
                record.set(spec.column, value)?;
            }
        }
        Ok(records)
    }

    /// Read one row of a feature frame back into a record
    pub fn from_row(df: &DataFrame, row: usize) -> Result<Self> {
        let out_of_range = || HeartIqError::ShapeError {
            expected: format!("row {}", row),
            actual: format!("{} rows", df.height()),
        };
        if row >= df.height() {
            return Err(out_of_range());
        }
        Self::from_dataframe(&df.slice(row as i64, 1))?
            .pop()
            .ok_or_else(out_of_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_table_matches_column_lists() {
        let numeric: Vec<&str> = FEATURES.iter().filter(|f| f.is_numeric()).map(|f| f.column).collect();
        let categorical: Vec<&str> = FEATURES.iter().filter(|f| !f.is_numeric()).map(|f| f.column).collect();

        let mut expected_numeric = NUMERIC_FEATURES.to_vec();
        let mut expected_categorical = CATEGORICAL_FEATURES.to_vec();
        let mut numeric_sorted = numeric.clone();
        let mut categorical_sorted = categorical.clone();
        expected_numeric.sort();
        expected_categorical.sort();
        numeric_sorted.sort();
        categorical_sorted.sort();

        assert_eq!(numeric_sorted, expected_numeric);
        assert_eq!(categorical_sorted, expected_categorical);
    }

    #[test]
    fn test_default_record_is_valid() {
        assert!(PatientRecord::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_domain() {
        let record = PatientRecord { thallium: 5, ..Default::default() };
        assert!(matches!(record.validate(), Err(HeartIqError::ValidationError(_))));

        let record = PatientRecord { st_depression: 7.0, ..Default::default() };
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_serde_uses_dataset_column_names() {
        let json = serde_json::to_value(PatientRecord::default()).unwrap();
        assert_eq!(json["Max HR"], 150.0);
        assert_eq!(json["Number of vessels fluro"], 0);
    }

    #[test]
    fn test_dataframe_roundtrip() {
        let record = PatientRecord { age: 63.0, thallium: 7, ..Default::default() };
        let df = PatientRecord::to_dataframe(&[PatientRecord::default(), record.clone()]).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 13);
        assert_eq!(PatientRecord::from_row(&df, 1).unwrap(), record);
        assert_eq!(
            PatientRecord::from_dataframe(&df).unwrap(),
            vec![PatientRecord::default(), record]
        );
        assert!(matches!(
            PatientRecord::from_row(&df, 2),
            Err(HeartIqError::ShapeError { .. })
        ));
    }
}
