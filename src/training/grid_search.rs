//! Exhaustive hyperparameter search with cross-validated F1

use super::cross_validation::{CVResults, CrossValidator};
use super::decision_tree::Criterion;
use super::metrics::f1_score;
use super::pipeline::HeartDiseasePipeline;
use super::random_forest::RandomForest;
use crate::data::take_rows;
use crate::error::{HeartIqError, Result};
use crate::preprocessing::ColumnTransformer;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Forest hyperparameters searched by [`GridSearchCV`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub criterion: Criterion,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            criterion: Criterion::Gini,
        }
    }
}

impl ForestParams {
    /// Unfitted forest with these parameters
    pub fn build(&self, random_state: u64) -> RandomForest {
        RandomForest::new(self.n_estimators)
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_criterion(self.criterion)
            .with_random_state(random_state)
    }
}

impl fmt::Display for ForestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let depth = self.max_depth.map_or_else(|| "None".to_string(), |d| d.to_string());
        write!(
            f,
            "criterion={}, max_depth={}, min_samples_split={}, n_estimators={}",
            self.criterion, depth, self.min_samples_split, self.n_estimators
        )
    }
}

/// Candidate values per hyperparameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<Option<usize>>,
    pub min_samples_split: Vec<usize>,
    pub criterion: Vec<Criterion>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![50, 100, 200],
            max_depth: vec![None, Some(10), Some(20)],
            min_samples_split: vec![2, 5, 10],
            criterion: vec![Criterion::Gini, Criterion::Entropy],
        }
    }
}

impl ParamGrid {
    /// Every combination, ordered by parameter name with the last name
    /// (`n_estimators`) varying fastest
    pub fn combinations(&self) -> Vec<ForestParams> {
        let mut combos = Vec::with_capacity(self.len());
        for &criterion in &self.criterion {
            for &max_depth in &self.max_depth {
                for &min_samples_split in &self.min_samples_split {
                    for &n_estimators in &self.n_estimators {
                        combos.push(ForestParams {
                            n_estimators,
                            max_depth,
                            min_samples_split,
                            criterion,
                        });
                    }
                }
            }
        }
        combos
    }

    pub fn len(&self) -> usize {
        self.n_estimators.len() * self.max_depth.len() * self.min_samples_split.len() * self.criterion.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(HeartIqError::InvalidParameter {
                name: "param_grid".to_string(),
                value: format!("{:?}", self),
                reason: "every parameter needs at least one value".to_string(),
            });
        }
        if self.n_estimators.contains(&0) {
            return Err(HeartIqError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.min_samples_split.iter().any(|&s| s < 2) {
            return Err(HeartIqError::InvalidParameter {
                name: "min_samples_split".to_string(),
                value: format!("{:?}", self.min_samples_split),
                reason: "must be at least 2".to_string(),
            });
        }
        if self.max_depth.contains(&Some(0)) {
            return Err(HeartIqError::InvalidParameter {
                name: "max_depth".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Cross-validation outcome of one combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub params: ForestParams,
    pub cv: CVResults,
    /// 1 = best; equal means share a rank
    pub rank: usize,
}

/// Outcome of a grid search
#[derive(Debug, Clone)]
pub struct GridSearchResult {
    /// Candidates in grid order
    pub candidates: Vec<CandidateResult>,
    pub best_index: usize,
    pub best_params: ForestParams,
    pub best_score: f64,
    /// Winning pipeline refitted on all rows passed to `fit`
    pub best_estimator: HeartDiseasePipeline,
    pub elapsed_secs: f64,
}

impl GridSearchResult {
    /// Best `n` candidates by mean score, ties in grid order
    pub fn top(&self, n: usize) -> Vec<&CandidateResult> {
        let mut ranked: Vec<&CandidateResult> = self.candidates.iter().collect();
        ranked.sort_by_key(|c| c.rank);
        ranked.truncate(n);
        ranked
    }
}

/// Preprocessed matrices of one fold
struct FoldData {
    x_train: Array2<f64>,
    y_train: Array1<usize>,
    x_val: Array2<f64>,
    y_val: Vec<usize>,
}

/// Exhaustive search over a [`ParamGrid`] scored by mean F1 over
/// stratified folds
#[derive(Debug, Clone)]
pub struct GridSearchCV {
    pub param_grid: ParamGrid,
    pub cv_folds: usize,
    pub random_state: u64,
    /// Worker threads; None uses the global rayon pool
    pub n_jobs: Option<usize>,
    /// Class count every forest is built with; 0 lets each fit infer it
    pub n_classes: usize,
}

impl Default for GridSearchCV {
    fn default() -> Self {
        Self::new(ParamGrid::default())
    }
}

impl GridSearchCV {
    pub fn new(param_grid: ParamGrid) -> Self {
        Self {
            param_grid,
            cv_folds: 5,
            random_state: 42,
            n_jobs: None,
            n_classes: 0,
        }
    }

    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: Option<usize>) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    pub fn with_n_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = n_classes;
        self
    }

    fn forest(&self, params: &ForestParams) -> RandomForest {
        params.build(self.random_state).with_n_classes(self.n_classes)
    }

    /// Score every combination, pick the best mean F1 (earliest wins ties)
    /// and refit it on all of `features`
    pub fn fit(&self, features: &DataFrame, y: &[usize]) -> Result<GridSearchResult> {
        self.param_grid.validate()?;
        if features.height() != y.len() {
            return Err(HeartIqError::ShapeError {
                expected: format!("{} labels", features.height()),
                actual: format!("{} labels", y.len()),
            });
        }

        match self.n_jobs {
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n.max(1))
                    .build()
                    .map_err(|e| HeartIqError::TrainingError(format!("thread pool: {}", e)))?;
                pool.install(|| self.search(features, y))
            }
            None => self.search(features, y),
        }
    }

    /// Fit one preprocessor per fold on the fold's training rows. A fold
    /// whose validation rows carry a category its training rows never saw
    /// cannot be scored and is left out for every candidate alike.
    fn prepare_folds(&self, features: &DataFrame, y: &[usize]) -> Result<Vec<FoldData>> {
        let splits = CrossValidator::stratified(self.cv_folds)
            .with_random_state(self.random_state)
            .split(y)?;

        let mut folds = Vec::with_capacity(splits.len());
        for (fold, split) in splits.into_iter().enumerate() {
            let train = take_rows(features, &split.train_indices)?;
            let val = take_rows(features, &split.test_indices)?;

            let mut preprocessor = ColumnTransformer::heart_disease();
            let x_train = preprocessor.fit_transform(&train)?;
            let x_val = match preprocessor.transform(&val) {
                Ok(x_val) => x_val,
                Err(HeartIqError::UnknownCategory { column, value }) => {
                    warn!(
                        fold,
                        column = %column,
                        value = %value,
                        "Skipping fold with a category unseen in its training rows"
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };

            folds.push(FoldData {
                x_train,
                y_train: split.train_indices.iter().map(|&i| y[i]).collect(),
                x_val,
                y_val: split.test_indices.iter().map(|&i| y[i]).collect(),
            });
        }

        if folds.is_empty() {
            return Err(HeartIqError::TrainingError(
                "no cross-validation fold could be scored".to_string(),
            ));
        }
        Ok(folds)
    }

    fn search(&self, features: &DataFrame, y: &[usize]) -> Result<GridSearchResult> {
        let start = Instant::now();
        let combos = self.param_grid.combinations();
        info!(
            candidates = combos.len(),
            folds = self.cv_folds,
            fits = combos.len() * self.cv_folds,
            "Starting grid search"
        );

        // Preprocessing does not depend on the forest parameters, so each
        // fold is transformed once and shared by every candidate.
        let folds = self.prepare_folds(features, y)?;

        let results: Vec<CVResults> = combos
            .par_iter()
            .map(|params| {
                let scores = folds
                    .iter()
                    .map(|fold| {
                        let mut forest = self.forest(params);
                        forest.fit(&fold.x_train, &fold.y_train)?;
                        let pred = forest.predict(&fold.x_val)?;
                        f1_score(&fold.y_val, &pred.to_vec())
                    })
                    .collect::<Result<Vec<f64>>>()?;
                let cv = CVResults::from_scores(scores);
                debug!(params = %params, mean = cv.mean_score, std = cv.std_score, "Scored candidate");
                Ok(cv)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut best_index = 0;
        for (i, cv) in results.iter().enumerate() {
            if cv.mean_score > results[best_index].mean_score {
                best_index = i;
            }
        }

        let candidates: Vec<CandidateResult> = combos
            .iter()
            .zip(&results)
            .map(|(params, cv)| CandidateResult {
                params: *params,
                rank: 1 + results.iter().filter(|o| o.mean_score > cv.mean_score).count(),
                cv: cv.clone(),
            })
            .collect();

        let best_params = combos[best_index];
        let best_score = results[best_index].mean_score;
        info!(best_params = %best_params, best_score, "Grid search finished, refitting best candidate");

        let mut best_estimator =
            HeartDiseasePipeline::new(ColumnTransformer::heart_disease(), self.forest(&best_params));
        best_estimator.fit(features, y)?;

        Ok(GridSearchResult {
            candidates,
            best_index,
            best_params,
            best_score,
            best_estimator,
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }
}
