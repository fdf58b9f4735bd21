//! Heart IQ - heart disease prediction
//!
//! This crate trains, persists, evaluates and serves a random-forest
//! classifier that predicts presence or absence of heart disease from 13
//! clinical features.
//!
//! # Modules
//!
//! - [`data`] - Patient schema, CSV loading, deterministic train/test split
//! - [`preprocessing`] - Label encoding, standard scaling, drop-first one-hot encoding
//! - [`training`] - Decision trees, random forest, stratified k-fold, grid search, metrics
//! - [`export`] - Persisted model artifact and the shared artifact handle
//! - [`inference`] - Single-record and batch prediction against a loaded artifact
//! - [`evaluation`] - Hold-out evaluation and classification report
//! - [`visualization`] - Confusion matrix and ROC curve rendering
//! - [`server`] - Form-based prediction web server
//! - [`cli`] - Command-line interface

pub mod error;

pub mod data;
pub mod preprocessing;
pub mod training;
pub mod export;
pub mod inference;
pub mod evaluation;
pub mod visualization;

pub mod server;
pub mod cli;

pub use error::{HeartIqError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{HeartIqError, Result};

    pub use crate::data::{
        Dataset, DatasetLoader, FeatureKind, FeatureSpec, PatientRecord, TrainTestSplit,
        FEATURES, TARGET_COLUMN,
    };

    pub use crate::preprocessing::{ColumnTransformer, LabelEncoder, OneHotEncoder, StandardScaler};

    pub use crate::training::{
        ClassificationReport, Criterion, CrossValidator, DecisionTree, ForestParams,
        GridSearchCV, GridSearchResult, HeartDiseasePipeline, ParamGrid, RandomForest,
        TrainEngine, TrainingConfig, TrainingOutcome,
    };

    pub use crate::export::{ArtifactHandle, ArtifactMetadata, ModelArtifact};

    pub use crate::inference::{InferenceEngine, Prediction};

    pub use crate::evaluation::{EvaluationConfig, EvaluationReport, Evaluator};

    pub use crate::server::{create_router, AppState, ServerConfig};
}
