//! Integration test: forests, cross-validation and grid search

mod common;

use heart_iq::data::{train_test_split, Dataset};
use heart_iq::preprocessing::{ColumnTransformer, LabelEncoder};
use heart_iq::HeartIqError;
use heart_iq::training::{
    CrossValidator, GridSearchCV, ParamGrid, RandomForest, TrainEngine, TrainingConfig,
};
use ndarray::Array1;

fn encoded() -> (Dataset, Vec<usize>) {
    let dataset = common::synthetic_dataset();
    let y = LabelEncoder::new().fit_transform(dataset.labels()).unwrap();
    (dataset, y)
}

#[test]
fn test_forest_probabilities_sum_to_one() {
    let (dataset, y) = encoded();
    let x = ColumnTransformer::heart_disease()
        .fit_transform(dataset.features())
        .unwrap();

    let mut forest = RandomForest::new(20).with_random_state(3);
    forest.fit(&x, &Array1::from_vec(y.clone())).unwrap();
    let proba = forest.predict_proba(&x).unwrap();

    assert_eq!(proba.dim(), (common::N_RECORDS, 2));
    for row in proba.rows() {
        assert!((row.sum() - 1.0).abs() < 1e-9);
        assert!(row.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }
    let predictions = forest.predict(&x).unwrap();
    assert!(predictions.iter().all(|&c| c < 2));

    let importances = forest.feature_importances().unwrap();
    assert_eq!(importances.len(), x.ncols());
    assert!((importances.sum() - 1.0).abs() < 1e-9);
}

#[test]
fn test_forest_is_deterministic_for_a_seed() {
    let (dataset, y) = encoded();
    let x = ColumnTransformer::heart_disease()
        .fit_transform(dataset.features())
        .unwrap();
    let y = Array1::from_vec(y);

    let mut a = RandomForest::new(15).with_random_state(11);
    let mut b = RandomForest::new(15).with_random_state(11);
    a.fit(&x, &y).unwrap();
    b.fit(&x, &y).unwrap();
    assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
}

#[test]
fn test_stratified_folds_partition_rows() {
    let (_, y) = encoded();
    let splits = CrossValidator::stratified(5).split(&y).unwrap();
    assert_eq!(splits.len(), 5);

    let mut seen = vec![0usize; y.len()];
    for split in &splits {
        assert_eq!(split.train_indices.len() + split.test_indices.len(), y.len());
        for &i in &split.test_indices {
            seen[i] += 1;
        }
        let positives = split.test_indices.iter().filter(|&&i| y[i] == 1).count();
        let expected = y.iter().filter(|&&c| c == 1).count() as f64 / 5.0;
        assert!((positives as f64 - expected).abs() <= 1.0);
    }
    assert!(seen.iter().all(|&count| count == 1));
}

#[test]
fn test_grid_search_reproducible() {
    let (dataset, y) = encoded();
    let search = || {
        GridSearchCV::new(common::small_grid())
            .with_cv_folds(3)
            .with_random_state(42)
            .with_n_jobs(Some(2))
            .fit(dataset.features(), &y)
            .unwrap()
    };

    let first = search();
    let second = search();

    assert_eq!(first.candidates.len(), 4);
    assert_eq!(first.best_params, second.best_params);
    assert_eq!(first.best_index, second.best_index);
    for (a, b) in first.candidates.iter().zip(&second.candidates) {
        assert_eq!(a.params, b.params);
        assert_eq!(a.cv.scores, b.cv.scores);
    }

    let best = &first.candidates[first.best_index];
    assert_eq!(best.rank, 1);
    assert!(first
        .candidates
        .iter()
        .all(|c| c.cv.mean_score <= first.best_score));
    assert!(first.best_estimator.is_fitted());
}

#[test]
fn test_default_grid_order() {
    let combos = ParamGrid::default().combinations();
    assert_eq!(combos.len(), 54);
    assert_eq!(combos[0].to_string(), "criterion=gini, max_depth=None, min_samples_split=2, n_estimators=50");
    assert_eq!(combos[1].n_estimators, 100);
    assert_eq!(combos[53].to_string(), "criterion=entropy, max_depth=20, min_samples_split=10, n_estimators=200");
}

#[test]
fn test_engine_outcome_reproducible() {
    let dataset = common::synthetic_dataset();
    let config = TrainingConfig::new()
        .with_param_grid(common::small_grid())
        .with_cv_folds(3);

    let a = TrainEngine::new(config.clone()).fit(&dataset).unwrap();
    let b = TrainEngine::new(config).fit(&dataset).unwrap();

    assert_eq!(a.best_params(), b.best_params());
    assert_eq!(a.best_score(), b.best_score());
    assert_eq!(a.holdout.f1_score, b.holdout.f1_score);
    assert_eq!(a.holdout.n_samples, 54);
    assert_eq!(a.artifact.target_mapping, vec!["Absence".to_string(), "Presence".to_string()]);
    assert_eq!(a.artifact.metadata.n_train_samples, 216);
}

#[test]
fn test_engine_rejects_single_label() {
    let (records, _) = common::synthetic_records(40, 1);
    let labels = vec!["Presence".to_string(); 40];
    let dataset = Dataset::from_records(&records, labels).unwrap();

    let config = TrainingConfig::new().with_param_grid(common::small_grid());
    assert!(TrainEngine::new(config).fit(&dataset).is_err());
}

#[test]
fn test_grid_search_skips_fold_with_unseen_category() {
    let (mut records, labels) = common::synthetic_records(common::N_RECORDS, 7);
    for (i, record) in records.iter_mut().enumerate() {
        record.ekg_results = match (i, record.ekg_results) {
            (0, _) => 1,
            (_, 1) => 2,
            (_, other) => other,
        };
    }
    let dataset = Dataset::from_records(&records, labels).unwrap();
    let y = LabelEncoder::new().fit_transform(dataset.labels()).unwrap();

    let result = GridSearchCV::new(common::small_grid())
        .with_cv_folds(5)
        .with_n_classes(2)
        .fit(dataset.features(), &y)
        .unwrap();

    // Only the fold validating the single EKG=1 row is left out
    assert!(result.candidates.iter().all(|c| c.cv.scores.len() == 4));
    let proba = result.best_estimator.predict_proba(dataset.features()).unwrap();
    assert_eq!(proba.dim(), (common::N_RECORDS, 2));
}

#[test]
fn test_engine_rejects_class_missing_from_training_partition() {
    let n = 20;
    let (records, _) = common::synthetic_records(n, 3);
    let split = train_test_split(n, 0.2, 42).unwrap();
    let labels: Vec<String> = (0..n)
        .map(|i| if split.test_indices.contains(&i) { "Presence" } else { "Absence" }.to_string())
        .collect();
    let dataset = Dataset::from_records(&records, labels).unwrap();

    let config = TrainingConfig::new()
        .with_param_grid(common::small_grid())
        .with_cv_folds(3);
    let err = TrainEngine::new(config).fit(&dataset).unwrap_err();
    assert!(matches!(err, HeartIqError::TrainingError(ref msg) if msg.contains("Presence")));
}
