//! Heart IQ CLI Module
//!
//! Command-line interface for training, evaluation, prediction and serving.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::data::{DatasetLoader, PatientRecord, TARGET_COLUMN};
use crate::evaluation::{EvaluationConfig, Evaluator, DEFAULT_REPORT_PATH};
use crate::export::ArtifactHandle;
use crate::inference::InferenceEngine;
use crate::preprocessing::FeatureStats;
use crate::server::ServerConfig;
use crate::training::{TrainEngine, TrainingConfig, DEFAULT_ARTIFACT_PATH, DEFAULT_DATA_PATH};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn alert(s: &str) -> ColoredString  { s.truecolor(235, 100, 100) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "heart-iq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Heart disease prediction: train, evaluate and serve a random forest")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Grid-search a random forest and write the model artifact
    Train {
        /// Labelled CSV dataset
        #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
        data: PathBuf,

        /// Output artifact file
        #[arg(short, long, default_value = DEFAULT_ARTIFACT_PATH)]
        output: PathBuf,

        /// Label column name
        #[arg(short, long, default_value = TARGET_COLUMN)]
        target: String,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Seed for the split, folds and forests
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of stratified cross-validation folds
        #[arg(long, default_value = "5")]
        cv_folds: usize,

        /// Worker threads for the search (default: all cores)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Print the training summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a trained artifact on its held-out partition
    Evaluate {
        /// Trained artifact file
        #[arg(short, long, default_value = DEFAULT_ARTIFACT_PATH)]
        model: PathBuf,

        /// Labelled CSV dataset the artifact was trained on
        #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
        data: PathBuf,

        /// Output figure (SVG)
        #[arg(short, long, default_value = DEFAULT_REPORT_PATH)]
        report: PathBuf,

        /// Skip rendering the figure
        #[arg(long)]
        no_plot: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Predict a single patient record
    Predict {
        /// Trained artifact file
        #[arg(short, long, default_value = DEFAULT_ARTIFACT_PATH)]
        model: PathBuf,

        #[command(flatten)]
        record: RecordArgs,

        /// Print the prediction as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show dataset information
    Info {
        /// CSV dataset
        #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
        data: PathBuf,

        /// Label column name
        #[arg(short, long, default_value = TARGET_COLUMN)]
        target: String,
    },

    /// Start the prediction web server
    Serve {
        /// Server port
        #[arg(short, long, env = "API_PORT", default_value = "8080")]
        port: u16,

        /// Server host
        #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Trained artifact file
        #[arg(short, long, env = "MODEL_PATH", default_value = DEFAULT_ARTIFACT_PATH)]
        model: PathBuf,
    },
}

/// Patient features as command-line flags, defaulting to the form defaults
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    #[arg(long, default_value = "50")]
    pub age: f64,
    /// 1 = male, 0 = female
    #[arg(long, default_value = "1")]
    pub sex: i64,
    /// 1-4
    #[arg(long, default_value = "1")]
    pub chest_pain_type: i64,
    /// Resting blood pressure
    #[arg(long, default_value = "120")]
    pub bp: f64,
    #[arg(long, default_value = "200")]
    pub cholesterol: f64,
    /// Fasting blood sugar above 120 mg/dl
    #[arg(long, default_value = "0")]
    pub fbs_over_120: i64,
    #[arg(long, default_value = "0")]
    pub ekg_results: i64,
    #[arg(long, default_value = "150")]
    pub max_hr: f64,
    #[arg(long, default_value = "0")]
    pub exercise_angina: i64,
    #[arg(long, default_value = "1.0")]
    pub st_depression: f64,
    #[arg(long, default_value = "1")]
    pub slope_of_st: i64,
    /// Major vessels coloured by fluoroscopy, 0-3
    #[arg(long, default_value = "0")]
    pub vessels_fluro: i64,
    /// 3 = normal, 6 = fixed, 7 = reversible
    #[arg(long, default_value = "3")]
    pub thallium: i64,
}

impl From<RecordArgs> for PatientRecord {
    fn from(args: RecordArgs) -> Self {
        PatientRecord {
            age: args.age,
            sex: args.sex,
            chest_pain_type: args.chest_pain_type,
            bp: args.bp,
            cholesterol: args.cholesterol,
            fbs_over_120: args.fbs_over_120,
            ekg_results: args.ekg_results,
            max_hr: args.max_hr,
            exercise_angina: args.exercise_angina,
            st_depression: args.st_depression,
            slope_of_st: args.slope_of_st,
            vessels_fluro: args.vessels_fluro,
            thallium: args.thallium,
        }
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(config: TrainingConfig, json: bool) -> anyhow::Result<()> {
    if json {
        let outcome = TrainEngine::new(config).run()?;
        println!("{}", serde_json::to_string_pretty(&outcome.summary())?);
        return Ok(());
    }

    section("Train");
    println!("  {:<18} {}", muted("Data"), config.data_path.display());
    println!("  {:<18} {}", muted("Candidates"), config.param_grid.len());
    println!("  {:<18} {}", muted("Folds"), config.cv_folds);
    println!();

    let artifact_path = config.artifact_path.clone();
    step_run("Searching hyperparameters");
    let start = Instant::now();
    let outcome = TrainEngine::new(config).run()?;
    step_done(&format!("{:.2?}", start.elapsed()));
    step_ok(&format!("Saved model → {}", artifact_path.display()));

    section("Best parameters");
    println!("  {}", outcome.best_params().to_string().white().bold());
    println!("  {:<18} {}", muted("CV F1 (mean)"), format!("{:.4}", outcome.best_score()).white().bold());

    section("Top candidates");
    println!("  {:>4}  {:>8} {:>8}  {}", muted("Rank"), muted("Mean F1"), muted("Std"), muted("Parameters"));
    let mut ranked: Vec<_> = outcome.candidates.iter().collect();
    ranked.sort_by_key(|c| c.rank);
    for candidate in ranked.iter().take(5) {
        println!(
            "  {:>4}  {:>8.4} {:>8.4}  {}",
            candidate.rank, candidate.cv.mean_score, candidate.cv.std_score, candidate.params
        );
    }

    section("Held-out partition");
    let holdout = &outcome.holdout;
    println!("  {:<18} {:.4}", muted("Accuracy"), holdout.accuracy);
    println!("  {:<18} {:.4}", muted("F1"), holdout.f1_score);
    println!("  {:<18} {}", muted("AUC-ROC"), fmt_opt(holdout.auc_roc));
    println!("  {:<18} {}", muted("Samples"), holdout.n_samples);

    section("Feature importances");
    for (name, importance) in outcome.artifact.pipeline.feature_importances().iter().take(8) {
        println!("  {:<32} {:.4}", name, importance);
    }
    println!();
    Ok(())
}

pub fn cmd_evaluate(config: EvaluationConfig, json: bool) -> anyhow::Result<()> {
    let report_path = config.report_path.clone();
    let report = Evaluator::new(config).run()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    print!("{}", report);

    section("Confusion matrix");
    print!("  {:<14}", "");
    for label in &report.labels {
        print!("{:>12}", muted(label));
    }
    println!();
    for (label, row) in report.labels.iter().zip(&report.confusion_matrix) {
        print!("  {:<14}", muted(label));
        for count in row {
            print!("{:>12}", count);
        }
        println!();
    }

    if let Some(path) = report_path {
        println!();
        step_ok(&format!("Saved figure → {}", path.display()));
    }
    println!();
    Ok(())
}

pub fn cmd_predict(model_path: &Path, record: PatientRecord, json: bool) -> anyhow::Result<()> {
    record.validate()?;
    let engine = InferenceEngine::new(ArtifactHandle::initialize(model_path)?);
    let prediction = engine.predict(&record)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
        return Ok(());
    }

    section("Prediction");
    let label = format!("Prediction: {}", prediction.label);
    if prediction.is_positive() {
        println!("  {}", alert(&label).bold());
    } else {
        println!("  {}", ok(&label).bold());
    }
    println!("  {:<18} {}", muted("Confidence Level"), prediction.confidence_percent().white());
    for (label, p) in engine.artifact().target_mapping.iter().zip(&prediction.probabilities) {
        println!("  {:<18} {:.4}", muted(label), p);
    }
    println!();
    println!("  {}", dim(crate::server::DISCLAIMER));
    println!();
    Ok(())
}

pub fn cmd_info(data_path: &Path, target: &str) -> anyhow::Result<()> {
    section("Data Info");

    let loader = DatasetLoader::new().with_target_column(target);
    let df = loader.read_csv(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!();

    println!(
        "  {:<26} {:<12} {:>6} {:>7} {:>9} {:>9} {:>9} {:>9}",
        muted("Column"),
        muted("Type"),
        muted("Nulls"),
        muted("Unique"),
        muted("Mean"),
        muted("Std"),
        muted("Min"),
        muted("Max")
    );
    println!("  {}", dim(&"─".repeat(92)));
    for stats in FeatureStats::describe(&df)? {
        println!(
            "  {:<26} {:<12} {:>6} {:>7} {:>9} {:>9} {:>9} {:>9}",
            stats.name,
            format!("{:?}", stats.dtype).truecolor(140, 140, 140),
            stats.null_count,
            stats.unique_count,
            fmt_opt(stats.mean),
            fmt_opt(stats.std),
            fmt_opt(stats.min),
            fmt_opt(stats.max)
        );
    }

    section("Labels");
    match loader.from_frame(&df) {
        Ok(dataset) => {
            for (label, count) in dataset.label_counts() {
                let share = count as f64 / dataset.len().max(1) as f64 * 100.0;
                println!("  {:<18} {:>6} {}", label, count, dim(&format!("({:.1}%)", share)));
            }
        }
        Err(e) => println!("  {}", format!("dataset does not match the training schema: {}", e).yellow()),
    }

    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(config: ServerConfig) -> anyhow::Result<()> {
    use crate::server::run_server;

    let (host, port) = (config.host.clone(), config.port);
    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Heart IQ".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Web UI ", &format!("http://{}:{}", host, port)));
    line_box(&kv("API    ", &format!("http://{}:{}/api/predict", host, port)));
    line_box(&kv("Health ", &format!("http://{}:{}/api/health", host, port)));
    line_box(&kv("Model  ", &config.artifact_path.display().to_string()));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[tokio::test]
    async fn test_evaluate_on_blocking_pool() {
        let dir = tempfile::tempdir().unwrap();
        let config = EvaluationConfig::new()
            .with_artifact_path(dir.path().join("missing.json"))
            .with_report_path(None);

        let result = tokio::task::spawn_blocking(move || cmd_evaluate(config, true))
            .await
            .unwrap();
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::error::HeartIqError>(),
            Some(crate::error::HeartIqError::ArtifactNotFound(_))
        ));
    }

    #[test]
    fn test_predict_defaults_match_form_defaults() {
        let cli = Cli::parse_from(["heart-iq", "predict"]);
        match cli.command {
            Commands::Predict { record, json, .. } => {
                assert!(!json);
                assert_eq!(PatientRecord::from(record), PatientRecord::default());
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[1mHeart\x1b[0m IQ"), "Heart IQ");
    }
}
