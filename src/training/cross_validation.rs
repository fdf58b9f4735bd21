//! Cross-validation splitters

use crate::error::{HeartIqError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cross-validation strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CVStrategy {
    /// K-Fold cross-validation
    KFold { n_splits: usize, shuffle: bool },
    /// Stratified K-Fold (maintains class distribution)
    StratifiedKFold { n_splits: usize, shuffle: bool },
}

impl Default for CVStrategy {
    fn default() -> Self {
        CVStrategy::StratifiedKFold { n_splits: 5, shuffle: false }
    }
}

/// A single train/validation split
#[derive(Debug, Clone, PartialEq)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Cross-validation splitter
#[derive(Debug, Clone)]
pub struct CrossValidator {
    strategy: CVStrategy,
    random_state: u64,
}

impl CrossValidator {
    /// Create a new cross-validator
    pub fn new(strategy: CVStrategy) -> Self {
        Self {
            strategy,
            random_state: 42,
        }
    }

    /// Unshuffled stratified k-fold
    pub fn stratified(n_splits: usize) -> Self {
        Self::new(CVStrategy::StratifiedKFold { n_splits, shuffle: false })
    }

    /// Set random state used when shuffling
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn n_splits(&self) -> usize {
        match self.strategy {
            CVStrategy::KFold { n_splits, .. } | CVStrategy::StratifiedKFold { n_splits, .. } => n_splits,
        }
    }

    /// Generate train/validation splits for `y`
    pub fn split(&self, y: &[usize]) -> Result<Vec<CVSplit>> {
        let n_splits = self.n_splits();
        if n_splits < 2 {
            return Err(HeartIqError::InvalidParameter {
                name: "n_splits".to_string(),
                value: n_splits.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        if y.len() < n_splits {
            return Err(HeartIqError::ValidationError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                y.len(),
                n_splits
            )));
        }

        let folds = match self.strategy {
            CVStrategy::KFold { shuffle, .. } => self.k_fold(y.len(), n_splits, shuffle),
            CVStrategy::StratifiedKFold { shuffle, .. } => self.stratified_k_fold(y, n_splits, shuffle)?,
        };

        Ok(Self::folds_to_splits(folds))
    }

    fn k_fold(&self, n_samples: usize, n_splits: usize, shuffle: bool) -> Vec<Vec<usize>> {
        let mut indices: Vec<usize> = (0..n_samples).collect();
        if shuffle {
            indices.shuffle(&mut ChaCha8Rng::seed_from_u64(self.random_state));
        }

        let base = n_samples / n_splits;
        let remainder = n_samples % n_splits;
        let mut folds = Vec::with_capacity(n_splits);
        let mut current = 0;
        for fold_idx in 0..n_splits {
            let size = if fold_idx < remainder { base + 1 } else { base };
            folds.push(indices[current..current + size].to_vec());
            current += size;
        }
        folds
    }

    /// Deal each class's samples round-robin over the folds. The dealer
    /// position carries over between classes so fold sizes stay balanced.
    fn stratified_k_fold(&self, y: &[usize], n_splits: usize, shuffle: bool) -> Result<Vec<Vec<usize>>> {
        let mut class_indices: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (idx, &class) in y.iter().enumerate() {
            class_indices.entry(class).or_default().push(idx);
        }

        if let Some((class, members)) = class_indices.iter().find(|(_, m)| m.len() < n_splits) {
            tracing::warn!(
                class = *class,
                members = members.len(),
                n_splits,
                "Least populated class has fewer members than folds"
            );
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); n_splits];
        let mut dealer = 0;
        for indices in class_indices.values_mut() {
            if shuffle {
                indices.shuffle(&mut rng);
            }
            for &idx in indices.iter() {
                folds[dealer % n_splits].push(idx);
                dealer += 1;
            }
        }

        if folds.iter().any(Vec::is_empty) {
            return Err(HeartIqError::ValidationError("cross-validation produced an empty fold".to_string()));
        }
        for fold in &mut folds {
            fold.sort_unstable();
        }
        Ok(folds)
    }

    fn folds_to_splits(folds: Vec<Vec<usize>>) -> Vec<CVSplit> {
        (0..folds.len())
            .map(|fold_idx| {
                let train_indices: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != fold_idx)
                    .flat_map(|(_, f)| f.iter().copied())
                    .collect();
                CVSplit {
                    train_indices,
                    test_indices: folds[fold_idx].clone(),
                    fold_idx,
                }
            })
            .collect()
    }
}

/// Scores of one configuration across folds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CVResults {
    pub scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
}

impl CVResults {
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n = scores.len().max(1) as f64;
        let mean_score = scores.iter().sum::<f64>() / n;
        let std_score = (scores.iter().map(|s| (s - mean_score).powi(2)).sum::<f64>() / n).sqrt();
        Self {
            scores,
            mean_score,
            std_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stratified_preserves_ratio() {
        let y: Vec<usize> = (0..100).map(|i| if i < 60 { 0 } else { 1 }).collect();
        let splits = CrossValidator::stratified(5).split(&y).unwrap();

        assert_eq!(splits.len(), 5);
        for split in &splits {
            assert_eq!(split.test_indices.len(), 20);
            let positives = split.test_indices.iter().filter(|&&i| y[i] == 1).count();
            assert_eq!(positives, 8);
            assert_eq!(split.train_indices.len() + split.test_indices.len(), 100);
        }
    }

    #[test]
    fn test_folds_partition_samples() {
        let y: Vec<usize> = (0..23).map(|i| i % 3 % 2).collect();
        let splits = CrossValidator::stratified(5).split(&y).unwrap();

        let mut seen: Vec<usize> = splits.iter().flat_map(|s| s.test_indices.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..23).collect::<Vec<_>>());
    }

    #[test]
    fn test_unshuffled_is_deterministic() {
        let y: Vec<usize> = (0..50).map(|i| i % 2).collect();
        let a = CrossValidator::stratified(5).with_random_state(1).split(&y).unwrap();
        let b = CrossValidator::stratified(5).with_random_state(2).split(&y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_k_fold_sizes() {
        let y = vec![0usize; 11];
        let splits = CrossValidator::new(CVStrategy::KFold { n_splits: 3, shuffle: true })
            .split(&y)
            .unwrap();
        let sizes: Vec<usize> = splits.iter().map(|s| s.test_indices.len()).collect();
        assert_eq!(sizes, vec![4, 4, 3]);
    }

    #[test]
    fn test_invalid_splits() {
        assert!(CrossValidator::stratified(1).split(&[0, 1]).is_err());
        assert!(CrossValidator::stratified(5).split(&[0, 1]).is_err());
    }

    #[test]
    fn test_cv_results() {
        let results = CVResults::from_scores(vec![0.5, 0.7]);
        assert!((results.mean_score - 0.6).abs() < 1e-12);
        assert!((results.std_score - 0.1).abs() < 1e-12);
    }
}
