//! Shared fixtures: a synthetic heart disease dataset and a quickly trained artifact

#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use heart_iq::data::{Dataset, PatientRecord};
use heart_iq::training::{Criterion, ParamGrid, TrainingConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const N_RECORDS: usize = 270;

pub const HEADER: &str = "Age,Sex,Chest pain type,BP,Cholesterol,FBS over 120,EKG results,Max HR,Exercise angina,ST depression,Slope of ST,Number of vessels fluro,Thallium,Heart Disease";

fn pick(rng: &mut ChaCha8Rng, domain: &[i64]) -> i64 {
    domain[rng.gen_range(0..domain.len())]
}

/// Records whose label depends on a noisy risk score, so the classes are
/// learnable but not perfectly separable
pub fn synthetic_records(n: usize, seed: u64) -> (Vec<PatientRecord>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut records = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);

    for _ in 0..n {
        let record = PatientRecord {
            age: rng.gen_range(29..=77) as f64,
            sex: pick(&mut rng, &[0, 1]),
            chest_pain_type: pick(&mut rng, &[1, 2, 3, 4]),
            bp: rng.gen_range(94..=200) as f64,
            cholesterol: rng.gen_range(126..=564) as f64,
            fbs_over_120: pick(&mut rng, &[0, 1]),
            ekg_results: pick(&mut rng, &[0, 1, 2]),
            max_hr: rng.gen_range(71..=202) as f64,
            exercise_angina: pick(&mut rng, &[0, 1]),
            st_depression: rng.gen_range(0..=40) as f64 / 10.0,
            slope_of_st: pick(&mut rng, &[1, 2, 3]),
            vessels_fluro: pick(&mut rng, &[0, 1, 2, 3]),
            thallium: pick(&mut rng, &[3, 6, 7]),
        };

        let score = risk_score(&record) + rng.gen_range(-0.6..0.6);
        labels.push(if score > 3.4 { "Presence" } else { "Absence" }.to_string());
        records.push(record);
    }

    (records, labels)
}

fn risk_score(r: &PatientRecord) -> f64 {
    0.04 * (r.age - 50.0)
        + 0.8 * (r.chest_pain_type == 4) as i64 as f64
        + 0.9 * r.exercise_angina as f64
        + 0.6 * r.st_depression
        + 0.7 * r.vessels_fluro as f64
        + 0.8 * (r.thallium == 7) as i64 as f64
        - 0.03 * (r.max_hr - 150.0)
}

pub fn synthetic_dataset() -> Dataset {
    let (records, labels) = synthetic_records(N_RECORDS, 7);
    Dataset::from_records(&records, labels).unwrap()
}

/// A record the synthetic risk score puts far on the disease side
pub fn high_risk_record() -> PatientRecord {
    PatientRecord {
        age: 70.0,
        sex: 1,
        chest_pain_type: 4,
        bp: 160.0,
        cholesterol: 320.0,
        fbs_over_120: 0,
        ekg_results: 2,
        max_hr: 95.0,
        exercise_angina: 1,
        st_depression: 3.6,
        slope_of_st: 2,
        vessels_fluro: 3,
        thallium: 7,
    }
}

/// Write records as a CSV in the dataset's column layout
pub fn write_csv(path: &Path, records: &[PatientRecord], labels: &[String]) {
    let mut out = String::new();
    writeln!(out, "{}", HEADER).unwrap();
    for (r, label) in records.iter().zip(labels) {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            r.age,
            r.sex,
            r.chest_pain_type,
            r.bp,
            r.cholesterol,
            r.fbs_over_120,
            r.ekg_results,
            r.max_hr,
            r.exercise_angina,
            r.st_depression,
            r.slope_of_st,
            r.vessels_fluro,
            r.thallium,
            label
        )
        .unwrap();
    }
    std::fs::write(path, out).unwrap();
}

/// Write the synthetic dataset into `dir` and return its path
pub fn write_synthetic_csv(dir: &Path) -> PathBuf {
    let (records, labels) = synthetic_records(N_RECORDS, 7);
    let path = dir.join("Heart_Disease_Prediction.csv");
    write_csv(&path, &records, &labels);
    path
}

/// Four small forests, enough to exercise the search quickly
pub fn small_grid() -> ParamGrid {
    ParamGrid {
        n_estimators: vec![10, 25],
        max_depth: vec![None, Some(5)],
        min_samples_split: vec![2],
        criterion: vec![Criterion::Gini],
    }
}

pub fn small_config(dir: &Path) -> TrainingConfig {
    TrainingConfig::new()
        .with_data_path(dir.join("Heart_Disease_Prediction.csv"))
        .with_artifact_path(dir.join("heart_disease_rf_optimized.json"))
        .with_param_grid(small_grid())
        .with_n_jobs(Some(2))
}
