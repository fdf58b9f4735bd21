//! Heart IQ - Main Entry Point
//!
//! Train, evaluate, query and serve the heart disease classifier.

use clap::Parser;
use heart_iq::cli::{cmd_evaluate, cmd_info, cmd_predict, cmd_serve, cmd_train, Cli, Commands};
use heart_iq::evaluation::EvaluationConfig;
use heart_iq::server::ServerConfig;
use heart_iq::training::TrainingConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heart_iq=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data, output, target, test_size, seed, cv_folds, jobs, json } => {
            let config = TrainingConfig::new()
                .with_data_path(data)
                .with_artifact_path(output)
                .with_target_column(target)
                .with_test_size(test_size)
                .with_random_state(seed)
                .with_cv_folds(cv_folds)
                .with_n_jobs(jobs);
            // Grid search runs on rayon; keep it off the async workers
            tokio::task::spawn_blocking(move || cmd_train(config, json)).await??;
        }
        Commands::Evaluate { model, data, report, no_plot, json } => {
            let config = EvaluationConfig::new()
                .with_artifact_path(model)
                .with_data_path(data)
                .with_report_path((!no_plot).then_some(report));
            // Forest scoring and SVG rendering are CPU-bound
            tokio::task::spawn_blocking(move || cmd_evaluate(config, json)).await??;
        }
        Commands::Predict { model, record, json } => {
            cmd_predict(&model, record.into(), json)?;
        }
        Commands::Info { data, target } => {
            cmd_info(&data, &target)?;
        }
        Commands::Serve { port, host, model } => {
            let config = ServerConfig::default()
                .with_host(host)
                .with_port(port)
                .with_artifact_path(model);
            cmd_serve(config).await?;
        }
    }

    Ok(())
}
