//! Motorguard - Motor Current Health Analysis
//!
//! Batch health classification for three-phase electric motors from
//! recorded current waveforms.
//!
//! # Usage
//!
//! ```bash
//! # Analyze the motors listed in ./motorguard.toml
//! cargo run --release
//!
//! # Explicit config and output paths
//! ./motorguard --config site_a.toml --output site_a_results.csv
//!
//! # Ad-hoc run over specific recordings
//! ./motorguard --data-dir recordings --motor EA0117AM --motor PC0101CM
//! ```
//!
//! # Environment Variables
//!
//! - `MOTORGUARD_CONFIG`: Path to the analysis config TOML
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use motorguard::{batch, report, AnalysisConfig};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "motorguard")]
#[command(about = "Motor current health analysis from three-phase waveform recordings")]
#[command(version)]
struct CliArgs {
    /// Path to the analysis config TOML (overrides the standard search order)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the waveform recording directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the stability threshold (cycles per sample)
    #[arg(long)]
    threshold: Option<f64>,

    /// Motor id to analyze; repeatable. Replaces the configured motor list.
    #[arg(long = "motor", value_name = "MOTOR_ID")]
    motors: Vec<String>,

    /// Override the results-table CSV path
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Override the JSON report path
    #[arg(long)]
    json_output: Option<PathBuf>,
}

impl CliArgs {
    /// Fold CLI overrides into the loaded config.
    fn apply_to(&self, config: &mut AnalysisConfig) {
        if let Some(dir) = &self.data_dir {
            config.input.data_dir.clone_from(dir);
        }
        if let Some(threshold) = self.threshold {
            config.health.threshold = threshold;
        }
        if !self.motors.is_empty() {
            config.input.motors.clone_from(&self.motors);
        }
        if let Some(path) = &self.output {
            config.report.csv_path.clone_from(path);
        }
        if let Some(path) = &self.json_output {
            config.report.json_path.clone_from(path);
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AnalysisConfig::load(),
    };
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    info!(
        motors = config.input.motors.len(),
        data_dir = %config.input.data_dir.display(),
        threshold = config.health.threshold,
        "Starting batch analysis"
    );

    let batch_report = batch::run_batch(&config);

    report::write_results_table(&batch_report, &config.report.csv_path)
        .context("Failed to write results table")?;
    report::write_json(&batch_report, &config.report.json_path)
        .context("Failed to write JSON report")?;

    for (motor_id, analysis) in batch_report.analyses() {
        info!(
            motor = %motor_id,
            verdict = %analysis.verdict.global,
            a = analysis.verdict.phases[0].stability_statistic,
            b = analysis.verdict.phases[1].stability_statistic,
            c = analysis.verdict.phases[2].stability_statistic,
            "Result"
        );
    }
    for (motor_id, error) in batch_report.failures() {
        info!(motor = %motor_id, reason = %error, "Skipped");
    }

    info!(
        analyzed = batch_report.analyzed_count(),
        skipped = batch_report.skipped_count(),
        results = %config.report.csv_path.display(),
        "Processing complete"
    );

    Ok(())
}
