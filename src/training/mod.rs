//! Model training module
//!
//! Provides:
//! - CART decision trees and the bagged random forest
//! - Stratified k-fold cross-validation
//! - Exhaustive grid search scored by F1
//! - The preprocessing + forest pipeline
//! - Classification metrics and reports
//! - The end-to-end training engine

mod config;
mod engine;
pub mod cross_validation;
pub mod decision_tree;
pub mod grid_search;
pub mod metrics;
pub mod pipeline;
pub mod random_forest;

pub use config::{TrainingConfig, DEFAULT_ARTIFACT_PATH, DEFAULT_DATA_PATH};
pub use engine::{TrainEngine, TrainingOutcome, TrainingSummary};
pub use cross_validation::{CVResults, CVSplit, CVStrategy, CrossValidator};
pub use decision_tree::{Criterion, DecisionTree, MaxFeatures, TreeNode};
pub use grid_search::{CandidateResult, ForestParams, GridSearchCV, GridSearchResult, ParamGrid};
pub use metrics::{ClassMetrics, ClassificationReport, ModelMetrics, RocCurve};
pub use pipeline::HeartDiseasePipeline;
pub use random_forest::RandomForest;
