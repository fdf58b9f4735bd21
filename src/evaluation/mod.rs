//! Model evaluation module
//!
//! Scores a persisted artifact on the same held-out partition that was
//! excluded from training and renders the confusion matrix and ROC curve.

mod config;
mod evaluator;

pub use config::{EvaluationConfig, DEFAULT_REPORT_PATH};
pub use evaluator::{EvaluationReport, Evaluator};
