//! Target label encoding

use crate::error::{HeartIqError, Result};
use serde::{Deserialize, Serialize};

/// Maps textual class labels to contiguous integers.
///
/// Classes are the sorted distinct labels seen at fit time, so the mapping
/// depends only on the label set, never on row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted class list
    pub fn from_classes(classes: Vec<String>) -> Result<Self> {
        let mut sorted = classes.clone();
        sorted.sort();
        sorted.dedup();
        if sorted != classes {
            return Err(HeartIqError::InvalidParameter {
                name: "classes".to_string(),
                value: format!("{:?}", classes),
                reason: "must be sorted and distinct".to_string(),
            });
        }
        Ok(Self { classes })
    }

    pub fn fit<S: AsRef<str>>(&mut self, labels: &[S]) -> &mut Self {
        let mut classes: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        self.classes = classes;
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.classes.is_empty()
    }

    /// Class index of a single label
    pub fn encode(&self, label: &str) -> Result<usize> {
        if !self.is_fitted() {
            return Err(HeartIqError::ModelNotFitted);
        }
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| HeartIqError::UnknownLabel(label.to_string()))
    }

    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.encode(l.as_ref())).collect()
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<Vec<usize>> {
        self.fit(labels);
        self.transform(labels)
    }

    /// Label of a class index
    pub fn inverse(&self, class: usize) -> Result<&str> {
        self.classes
            .get(class)
            .map(String::as_str)
            .ok_or(HeartIqError::UnknownClass(class))
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_mapping() {
        let mut encoder = LabelEncoder::new();
        let encoded = encoder.fit_transform(&["Presence", "Absence", "Presence"]).unwrap();
        assert_eq!(encoder.classes(), &["Absence".to_string(), "Presence".to_string()]);
        assert_eq!(encoded, vec![1, 0, 1]);
        assert_eq!(encoder.inverse(1).unwrap(), "Presence");
    }

    #[test]
    fn test_transform_is_idempotent() {
        let mut encoder = LabelEncoder::new();
        encoder.fit(&["Absence", "Presence"]);
        let first = encoder.transform(&["Presence", "Absence"]).unwrap();
        let second = encoder.transform(&["Presence", "Absence"]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_label_and_class() {
        let mut encoder = LabelEncoder::new();
        encoder.fit(&["Absence", "Presence"]);
        assert!(matches!(encoder.encode("Maybe"), Err(HeartIqError::UnknownLabel(_))));
        assert!(matches!(encoder.inverse(2), Err(HeartIqError::UnknownClass(2))));
    }

    #[test]
    fn test_from_classes_requires_sorted() {
        assert!(LabelEncoder::from_classes(vec!["Absence".into(), "Presence".into()]).is_ok());
        assert!(LabelEncoder::from_classes(vec!["Presence".into(), "Absence".into()]).is_err());
    }

    #[test]
    fn test_unfitted() {
        assert!(matches!(LabelEncoder::new().encode("Absence"), Err(HeartIqError::ModelNotFitted)));
    }
}
