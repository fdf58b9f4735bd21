//! Random Forest classifier

use super::decision_tree::{argmax, Criterion, DecisionTree, MaxFeatures};
use crate::error::{HeartIqError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random Forest model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split
    pub max_features: MaxFeatures,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Random state
    pub random_state: u64,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
    /// Number of features
    n_features: usize,
    /// Width of the probability output; 0 means the labels decide at fit time
    n_classes: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    /// Create a new classifier forest
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            criterion: Criterion::Gini,
            random_state: 42,
            feature_importances: None,
            n_features: 0,
            n_classes: 0,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fix the number of classes, so `predict_proba` keeps one column per
    /// class even when the training rows miss one
    pub fn with_n_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = n_classes;
        self
    }

    /// Fit the forest to training data.
    ///
    /// Tree `i` draws its bootstrap sample and its feature-sampling seed
    /// from an RNG seeded with `random_state + i`, so the fitted forest does
    /// not depend on how rayon schedules the trees.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(HeartIqError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(HeartIqError::TrainingError("cannot fit a forest on empty data".to_string()));
        }
        if self.n_estimators == 0 {
            return Err(HeartIqError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let observed = y.iter().max().map_or(0, |m| m + 1);
        let n_classes = if self.n_classes == 0 { observed } else { self.n_classes };
        if observed > n_classes {
            return Err(HeartIqError::UnknownClass(observed - 1));
        }
        let base_seed = self.random_state;

        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));

                let sample_indices: Vec<usize> = if self.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot: Array1<usize> = sample_indices.iter().map(|&i| y[i]).collect();

                let mut tree = DecisionTree::new()
                    .with_max_depth(self.max_depth)
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_max_features(self.max_features)
                    .with_criterion(self.criterion)
                    .with_random_state(rng.next_u64())
                    .with_n_classes(n_classes);

                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        self.n_features = n_features;
        self.n_classes = n_classes;
        self.compute_feature_importances();

        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        let mut total_importances = vec![0.0; self.n_features];

        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (total, &val) in total_importances.iter_mut().zip(imp.iter()) {
                    *total += val;
                }
            }
        }

        let total: f64 = total_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut total_importances {
                *imp /= total;
            }
        }

        self.feature_importances = Some(Array1::from_vec(total_importances));
    }

    /// Mean of the trees' leaf distributions, one row per sample
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(HeartIqError::ModelNotFitted);
        }

        let per_tree: Vec<Array2<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict_proba(x))
            .collect::<Result<Vec<_>>>()?;

        let mut proba = Array2::zeros((x.nrows(), self.n_classes));
        for p in &per_tree {
            proba += p;
        }
        proba /= self.trees.len() as f64;
        Ok(proba)
    }

    /// Most probable class per sample (ties go to the lowest class index)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.rows().into_iter().map(argmax).collect())
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn toy() -> (Array2<f64>, Array1<usize>) {
        let x = array![
            [1.0, 2.0, 0.0],
            [1.5, 1.8, 0.0],
            [2.0, 2.2, 0.0],
            [2.5, 1.9, 1.0],
            [5.0, 8.0, 1.0],
            [6.0, 9.0, 1.0],
            [5.5, 8.5, 0.0],
            [6.5, 9.5, 1.0]
        ];
        let y = array![0usize, 0, 0, 0, 1, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn test_fit_predict() {
        let (x, y) = toy();
        let mut rf = RandomForest::new(25).with_max_features(MaxFeatures::All);
        rf.fit(&x, &y).unwrap();

        assert_eq!(rf.trees().len(), 25);
        assert_eq!(rf.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_proba_sums_to_one() {
        let (x, y) = toy();
        let mut rf = RandomForest::new(10);
        rf.fit(&x, &y).unwrap();

        let proba = rf.predict_proba(&x).unwrap();
        assert_eq!(proba.ncols(), 2);
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reproducible() {
        let (x, y) = toy();
        let mut a = RandomForest::new(10).with_random_state(42);
        let mut b = RandomForest::new(10).with_random_state(42);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_fixed_class_count_survives_missing_class() {
        let (x, _) = toy();
        let y = Array1::zeros(x.nrows());
        let mut rf = RandomForest::new(5).with_n_classes(2);
        rf.fit(&x, &y).unwrap();

        let proba = rf.predict_proba(&x).unwrap();
        assert_eq!(proba.ncols(), 2);
        assert!(proba.column(1).iter().all(|&p| p == 0.0));

        let mut too_narrow = RandomForest::new(5).with_n_classes(1);
        let (_, y) = toy();
        assert!(matches!(too_narrow.fit(&x, &y), Err(HeartIqError::UnknownClass(1))));
    }

    #[test]
    fn test_importances_sum_to_one() {
        let (x, y) = toy();
        let mut rf = RandomForest::new(10);
        rf.fit(&x, &y).unwrap();
        let total: f64 = rf.feature_importances().unwrap().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_not_fitted() {
        let (x, _) = toy();
        assert!(matches!(RandomForest::new(5).predict(&x), Err(HeartIqError::ModelNotFitted)));
    }
}
