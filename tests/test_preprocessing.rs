//! Integration test: label encoding, scaling and one-hot encoding

mod common;

use heart_iq::data::{PatientRecord, NUMERIC_FEATURES};
use heart_iq::error::HeartIqError;
use heart_iq::preprocessing::{ColumnTransformer, LabelEncoder};

#[test]
fn test_column_transformer_output_shape() {
    let dataset = common::synthetic_dataset();
    let mut transformer = ColumnTransformer::heart_disease();
    let x = transformer.fit_transform(dataset.features()).unwrap();

    // 5 scaled columns plus (k - 1) indicators for each of the 8 categoricals:
    // Sex 1, Chest pain 3, FBS 1, EKG 2, Angina 1, Slope 2, Vessels 3, Thallium 2
    assert_eq!(x.nrows(), common::N_RECORDS);
    assert_eq!(x.ncols(), 20);
    assert_eq!(transformer.output_feature_names().len(), 20);
    assert_eq!(transformer.output_feature_names()[0], "Age");
    assert!(transformer.output_feature_names().contains(&"Thallium_7".to_string()));
}

#[test]
fn test_numeric_columns_standardized() {
    let dataset = common::synthetic_dataset();
    let mut transformer = ColumnTransformer::heart_disease();
    let x = transformer.fit_transform(dataset.features()).unwrap();

    for j in 0..NUMERIC_FEATURES.len() {
        let column = x.column(j);
        let n = column.len() as f64;
        let mean = column.sum() / n;
        let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-9, "column {} mean {}", j, mean);
        assert!((var - 1.0).abs() < 1e-9, "column {} variance {}", j, var);
    }
}

#[test]
fn test_indicator_columns_are_binary() {
    let dataset = common::synthetic_dataset();
    let mut transformer = ColumnTransformer::heart_disease();
    let x = transformer.fit_transform(dataset.features()).unwrap();

    for j in NUMERIC_FEATURES.len()..x.ncols() {
        assert!(x.column(j).iter().all(|&v| v == 0.0 || v == 1.0));
    }
}

#[test]
fn test_unknown_category_rejected() {
    let dataset = common::synthetic_dataset();
    let mut transformer = ColumnTransformer::heart_disease();
    transformer.fit(dataset.features()).unwrap();

    let record = PatientRecord {
        thallium: 5,
        ..PatientRecord::default()
    };
    let frame = PatientRecord::to_dataframe(&[record]).unwrap();
    match transformer.transform(&frame) {
        Err(HeartIqError::UnknownCategory { column, value }) => {
            assert_eq!(column, "Thallium");
            assert_eq!(value, "5");
        }
        other => panic!("expected UnknownCategory, got {:?}", other.map(|x| x.dim())),
    }
}

#[test]
fn test_label_encoder_idempotent() {
    let dataset = common::synthetic_dataset();

    let mut first = LabelEncoder::new();
    let y1 = first.fit_transform(dataset.labels()).unwrap();
    let mut second = LabelEncoder::new();
    second.fit(dataset.labels());
    second.fit(dataset.labels());
    let y2 = second.transform(dataset.labels()).unwrap();

    assert_eq!(first.classes(), &["Absence".to_string(), "Presence".to_string()]);
    assert_eq!(first.classes(), second.classes());
    assert_eq!(y1, y2);

    let restored = LabelEncoder::from_classes(first.classes().to_vec()).unwrap();
    assert_eq!(restored.transform(dataset.labels()).unwrap(), y1);
    assert_eq!(restored.inverse(1).unwrap(), "Presence");
}

#[test]
fn test_label_encoder_rejects_unknown_label() {
    let encoder = LabelEncoder::from_classes(vec!["Absence".to_string(), "Presence".to_string()]).unwrap();
    assert!(matches!(encoder.encode("Maybe"), Err(HeartIqError::UnknownLabel(_))));
}
