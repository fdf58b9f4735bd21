use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use heart_iq::data::{Dataset, PatientRecord};
use heart_iq::preprocessing::{ColumnTransformer, LabelEncoder};
use heart_iq::training::RandomForest;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_dataset(n_rows: usize) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut records = Vec::with_capacity(n_rows);
    let mut labels = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        let record = PatientRecord {
            age: rng.gen_range(29..=77) as f64,
            sex: rng.gen_range(0..=1),
            chest_pain_type: rng.gen_range(1..=4),
            bp: rng.gen_range(94..=200) as f64,
            cholesterol: rng.gen_range(126..=564) as f64,
            fbs_over_120: rng.gen_range(0..=1),
            ekg_results: rng.gen_range(0..=2),
            max_hr: rng.gen_range(71..=202) as f64,
            exercise_angina: rng.gen_range(0..=1),
            st_depression: rng.gen_range(0..=40) as f64 / 10.0,
            slope_of_st: rng.gen_range(1..=3),
            vessels_fluro: rng.gen_range(0..=3),
            thallium: *[3, 6, 7].choose(&mut rng).unwrap(),
        };
        let risk = record.st_depression + record.vessels_fluro as f64 + record.exercise_angina as f64;
        labels.push(if risk + rng.gen::<f64>() > 3.0 { "Presence" } else { "Absence" }.to_string());
        records.push(record);
    }

    Dataset::from_records(&records, labels).unwrap()
}

fn prepare(n_rows: usize) -> (Array2<f64>, Array1<usize>) {
    let dataset = create_dataset(n_rows);
    let x = ColumnTransformer::heart_disease()
        .fit_transform(dataset.features())
        .unwrap();
    let y = LabelEncoder::new().fit_transform(dataset.labels()).unwrap();
    (x, Array1::from_vec(y))
}

fn bench_forest_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_fit");
    group.sample_size(10);

    for n_rows in [270, 1000, 5000].iter() {
        let (x, y) = prepare(*n_rows);
        group.bench_with_input(BenchmarkId::new("100_trees", n_rows), &(x, y), |b, (x, y)| {
            b.iter(|| {
                let mut forest = RandomForest::new(100).with_random_state(42);
                forest.fit(black_box(x), black_box(y)).unwrap();
            })
        });
    }

    group.finish();
}

fn bench_forest_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_predict");
    let (x, y) = prepare(1000);
    let mut forest = RandomForest::new(100).with_random_state(42);
    forest.fit(&x, &y).unwrap();

    for n_rows in [1, 100, 1000].iter() {
        let batch = x.slice(ndarray::s![..*n_rows, ..]).to_owned();
        group.bench_with_input(BenchmarkId::new("predict_proba", n_rows), &batch, |b, batch| {
            b.iter(|| forest.predict_proba(black_box(batch)).unwrap())
        });
    }

    group.finish();
}

fn bench_preprocessing(c: &mut Criterion) {
    let dataset = create_dataset(5000);
    c.bench_function("column_transformer_fit_transform", |b| {
        b.iter(|| {
            ColumnTransformer::heart_disease()
                .fit_transform(black_box(dataset.features()))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_forest_fit, bench_forest_predict, bench_preprocessing);
criterion_main!(benches);
