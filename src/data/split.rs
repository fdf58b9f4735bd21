//! Deterministic train/test split

use crate::error::{HeartIqError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Row indices of a train/test partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Shuffle `0..n_samples` with a seeded RNG and cut off the test partition.
///
/// The test partition has `ceil(test_size * n_samples)` rows and takes the
/// first positions of the permutation; the remaining rows form the training
/// partition. The same `(n_samples, test_size, seed)` always yields the same
/// partition.
pub fn train_test_split(n_samples: usize, test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(HeartIqError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }

    let n_test = (test_size * n_samples as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(HeartIqError::ValidationError(format!(
            "test_size={} with {} samples leaves an empty partition",
            test_size, n_samples
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_indices = indices.split_off(n_test);
    Ok(TrainTestSplit {
        train_indices,
        test_indices: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(270, 0.2, 42).unwrap();
        assert_eq!(split.test_indices.len(), 54);
        assert_eq!(split.train_indices.len(), 216);

        let mut all: Vec<usize> = split.train_indices.iter().chain(split.test_indices.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..270).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = train_test_split(100, 0.2, 42).unwrap();
        let b = train_test_split(100, 0.2, 42).unwrap();
        let c = train_test_split(100, 0.2, 7).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_invalid_test_size() {
        assert!(train_test_split(10, 0.0, 42).is_err());
        assert!(train_test_split(10, 1.0, 42).is_err());
        assert!(train_test_split(1, 0.5, 42).is_err());
    }
}
