//! Prediction form parsing

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::data::{FeatureKind, FeatureSpec, PatientRecord, FEATURES};

/// A rejected form field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Raw submitted form values keyed by form field name
#[derive(Debug, Clone, Default)]
pub struct FormValues(HashMap<String, String>);

impl FormValues {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self(values)
    }

    /// Submitted value, trimmed
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(|v| v.trim())
    }

    /// Value to show in the form: the submitted one or the feature default
    pub fn display_value(&self, spec: &FeatureSpec) -> String {
        if let Some(value) = self.get(spec.form_name) {
            return value.to_string();
        }
        match spec.kind {
            FeatureKind::Numeric { default, .. } => default.to_string(),
            FeatureKind::Categorical { default, .. } => default.to_string(),
        }
    }

    /// Parse and validate every field, collecting one error per bad field
    pub fn parse(&self) -> Result<PatientRecord, Vec<FormError>> {
        let mut record = PatientRecord::default();
        let mut errors = Vec::new();

        for spec in FEATURES.iter() {
            match self.parse_field(spec) {
                Ok(value) => {
                    if let Err(e) = record.set(spec.column, value) {
                        errors.push(FormError {
                            field: spec.form_name,
                            message: e.to_string(),
                        });
                    }
                }
                Err(message) => errors.push(FormError {
                    field: spec.form_name,
                    message,
                }),
            }
        }

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }

    fn parse_field(&self, spec: &FeatureSpec) -> Result<f64, String> {
        let raw = self
            .get(spec.form_name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| format!("{} is required", spec.label))?;

        match spec.kind {
            FeatureKind::Numeric { min, max, .. } => {
                let value: f64 = raw
                    .parse()
                    .map_err(|_| format!("{} must be a number, got '{}'", spec.label, raw))?;
                if !value.is_finite() || value < min || value > max {
                    return Err(format!("{} must be between {} and {}", spec.label, min, max));
                }
                Ok(value)
            }
            FeatureKind::Categorical { domain, .. } => {
                let value: i64 = raw
                    .parse()
                    .map_err(|_| format!("{} must be a whole number, got '{}'", spec.label, raw))?;
                if !domain.contains(&value) {
                    return Err(format!("{} must be one of {:?}", spec.label, domain));
                }
                Ok(value as f64)
            }
        }
    }
}

impl From<HashMap<String, String>> for FormValues {
    fn from(values: HashMap<String, String>) -> Self {
        Self::new(values)
    }
}
