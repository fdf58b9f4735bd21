//! CART decision tree classifier

use crate::error::{HeartIqError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decision tree node. Children are indices into the tree's node arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with the class distribution of its training samples
    Leaf {
        distribution: Vec<f64>,
        n_samples: usize,
    },
    /// Internal node: samples with `x[feature_idx] <= threshold` go left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
        impurity: f64,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    /// Gini impurity
    Gini,
    /// Shannon entropy (bits)
    Entropy,
}

impl Criterion {
    fn impurity(&self, counts: &[usize], total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let n = total as f64;
        match self {
            Criterion::Gini => 1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>(),
            Criterion::Entropy => -counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.log2()
                })
                .sum::<f64>(),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Gini => write!(f, "gini"),
            Criterion::Entropy => write!(f, "entropy"),
        }
    }
}

impl FromStr for Criterion {
    type Err = HeartIqError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gini" => Ok(Criterion::Gini),
            "entropy" => Ok(Criterion::Entropy),
            other => Err(HeartIqError::InvalidParameter {
                name: "criterion".to_string(),
                value: other.to_string(),
                reason: "expected 'gini' or 'entropy'".to_string(),
            }),
        }
    }
}

/// Number of features examined at each split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1
    Sqrt,
    /// Every feature
    All,
    /// A fixed count, capped at `n_features`
    Fixed(usize),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(k) => *k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Decision tree classifier over integer class labels `0..n_classes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Node arena; index 0 is the root
    nodes: Vec<TreeNode>,
    /// Maximum depth (None = grow until pure)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split
    pub max_features: MaxFeatures,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Seed for the per-split feature sampling
    pub random_state: u64,
    /// Number of classes; inferred from `y` when None
    n_classes: Option<usize>,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-fit scratch state
struct Builder<'a> {
    x: &'a Array2<f64>,
    y: &'a Array1<usize>,
    n_classes: usize,
    n_candidates: usize,
    rng: ChaCha8Rng,
    importances: Vec<f64>,
}

/// Best split found for a node
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    child_impurity: f64,
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            criterion: Criterion::Gini,
            random_state: 0,
            n_classes: None,
            n_features: 0,
            feature_importances: None,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set criterion
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fix the number of classes, so that leaf distributions keep their
    /// width even when a bootstrap sample misses a class
    pub fn with_n_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = Some(n_classes);
        self
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(HeartIqError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 || n_features == 0 {
            return Err(HeartIqError::TrainingError("cannot fit a tree on empty data".to_string()));
        }

        let observed = y.iter().max().map_or(0, |m| m + 1);
        let n_classes = self.n_classes.unwrap_or(observed);
        if observed > n_classes {
            return Err(HeartIqError::UnknownClass(observed - 1));
        }

        let mut builder = Builder {
            x,
            y,
            n_classes,
            n_candidates: self.max_features.resolve(n_features),
            rng: ChaCha8Rng::seed_from_u64(self.random_state),
            importances: vec![0.0; n_features],
        };

        self.nodes.clear();
        self.n_features = n_features;
        self.n_classes = Some(n_classes);

        let indices: Vec<usize> = (0..n_samples).collect();
        self.build(&mut builder, indices, 0);

        let total: f64 = builder.importances.iter().sum();
        if total > 0.0 {
            for imp in &mut builder.importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(builder.importances));

        Ok(self)
    }

    fn class_counts(builder: &Builder<'_>, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; builder.n_classes];
        for &i in indices {
            counts[builder.y[i]] += 1;
        }
        counts
    }

    /// Grow the subtree for `indices`, returning its node index
    fn build(&mut self, builder: &mut Builder<'_>, indices: Vec<usize>, depth: usize) -> usize {
        let n_samples = indices.len();
        let counts = Self::class_counts(builder, &indices);
        let impurity = self.criterion.impurity(&counts, n_samples);
        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || is_pure;

        let split = if should_stop {
            None
        } else {
            self.find_best_split(builder, &indices, &counts)
        };

        let Some(split) = split else {
            self.nodes.push(Self::leaf(&counts, n_samples));
            return self.nodes.len() - 1;
        };

        builder.importances[split.feature_idx] +=
            n_samples as f64 * impurity - split.child_impurity;

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| builder.x[[i, split.feature_idx]] <= split.threshold);

        let node_idx = self.nodes.len();
        // Placeholder until both children exist
        self.nodes.push(TreeNode::Leaf {
            distribution: Vec::new(),
            n_samples,
        });
        let left = self.build(builder, left_indices, depth + 1);
        let right = self.build(builder, right_indices, depth + 1);
        self.nodes[node_idx] = TreeNode::Split {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left,
            right,
            n_samples,
            impurity,
        };
        node_idx
    }

    fn leaf(counts: &[usize], n_samples: usize) -> TreeNode {
        let n = n_samples.max(1) as f64;
        TreeNode::Leaf {
            distribution: counts.iter().map(|&c| c as f64 / n).collect(),
            n_samples,
        }
    }

    /// Examine features in a random order until `n_candidates` non-constant
    /// features have been scanned, keeping the split with the lowest
    /// weighted child impurity (sum of `n_child * impurity_child`).
    fn find_best_split(
        &self,
        builder: &mut Builder<'_>,
        indices: &[usize],
        parent_counts: &[usize],
    ) -> Option<SplitCandidate> {
        let n_features = builder.x.ncols();
        let mut order: Vec<usize> = (0..n_features).collect();
        order.shuffle(&mut builder.rng);

        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0;
        let mut pairs: Vec<(f64, usize)> = Vec::with_capacity(indices.len());

        for feature_idx in order {
            if visited >= builder.n_candidates {
                break;
            }

            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (builder.x[[i, feature_idx]], builder.y[i])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let (first, last) = match (pairs.first(), pairs.last()) {
                (Some(f), Some(l)) => (f.0, l.0),
                _ => continue,
            };
            if first >= last {
                continue;
            }
            visited += 1;

            let total = pairs.len();
            let mut left_counts = vec![0usize; builder.n_classes];
            let mut right_counts = parent_counts.to_vec();

            for pos in 0..total - 1 {
                let (value, class) = pairs[pos];
                left_counts[class] += 1;
                right_counts[class] -= 1;

                let next_value = pairs[pos + 1].0;
                if next_value <= value {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = total - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let child_impurity = n_left as f64 * self.criterion.impurity(&left_counts, n_left)
                    + n_right as f64 * self.criterion.impurity(&right_counts, n_right);

                if best.as_ref().map_or(true, |b| child_impurity < b.child_impurity) {
                    let mut threshold = value / 2.0 + next_value / 2.0;
                    if threshold >= next_value {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        child_impurity,
                    });
                }
            }
        }

        best
    }

    fn leaf_for(&self, sample: ArrayView1<'_, f64>) -> Result<&[f64]> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx).ok_or(HeartIqError::ModelNotFitted)? {
                TreeNode::Leaf { distribution, .. } => return Ok(distribution),
                TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                    idx = if sample[*feature_idx] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(HeartIqError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(HeartIqError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }

    /// Class probabilities, one row per sample
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_input(x)?;
        let n_classes = self.n_classes();
        let mut proba = Array2::zeros((x.nrows(), n_classes));
        for (i, row) in x.rows().into_iter().enumerate() {
            for (j, p) in self.leaf_for(row)?.iter().enumerate() {
                proba[[i, j]] = *p;
            }
        }
        Ok(proba)
    }

    /// Most probable class per sample
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.rows().into_iter().map(argmax).collect())
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes.unwrap_or(0)
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        if self.nodes.is_empty() {
            0
        } else {
            self.node_depth(0)
        }
    }

    fn node_depth(&self, idx: usize) -> usize {
        match &self.nodes[idx] {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + self.node_depth(*left).max(self.node_depth(*right)),
        }
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }
}

/// Index of the largest value; ties resolve to the lowest index
pub(crate) fn argmax(row: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}
