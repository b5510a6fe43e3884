//! CLI entry point for the relclean experiment-data cleaner.
//!
//! Provides subcommands for running the full cleaning pipeline over a
//! directory of per-participant result files and for rechecking a
//! previously written trial-level table.

use anyhow::Result;
use clap::{Parser, Subcommand};
use relclean::output::print_indexed_csv;
use relclean::pipeline::runner::{recheck_trials, run};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "relclean")]
#[command(about = "Cleans and aggregates relational-training experiment data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a directory of result files and write the analysis tables
    Clean {
        /// Directory containing the per-participant CSV files
        #[arg(short, long, default_value = "data")]
        input_dir: PathBuf,

        /// Directory the cleaned tables are written to
        #[arg(short, long, default_value = "processed")]
        output_dir: PathBuf,
    },
    /// Recompute block-level sums from a written trial-level table
    Summary {
        /// Path to a trials_clean.csv from a previous run
        #[arg(value_name = "TRIALS_CSV")]
        trials: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/relclean.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("relclean.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean {
            input_dir,
            output_dir,
        } => {
            let report = run(&input_dir, &output_dir)?;
            info!(
                trials = report.trials.n_rows(),
                blocks = report.blocks.n_rows(),
                conditions = report.conditions.len(),
                "pipeline finished"
            );
        }
        Commands::Summary { trials } => {
            let blocks = recheck_trials(&trials)?;
            print_indexed_csv(&blocks)?;
        }
    }

    Ok(())
}
