//! Batch Analysis
//!
//! Runs the health evaluation across the configured motor list. Each
//! motor's evaluation is independent and side-effect-free, so motors run
//! in parallel; one motor's failure never aborts the run. Every motor
//! yields exactly one typed outcome (an analysis, or a failure with the
//! reason), collected in configuration order.

use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::processing::{EvaluationError, PhaseHealthEvaluator};
use crate::types::MotorAnalysis;
use crate::waveform::{WaveformError, WaveformRecording};

/// Why a motor was skipped.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Waveform(#[from] WaveformError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// One motor's result within a batch run.
#[derive(Debug)]
pub struct MotorOutcome {
    pub motor_id: String,
    pub result: Result<MotorAnalysis, AnalysisError>,
}

impl MotorOutcome {
    pub fn analysis(&self) -> Option<&MotorAnalysis> {
        self.result.as_ref().ok()
    }

    pub fn failure(&self) -> Option<&AnalysisError> {
        self.result.as_ref().err()
    }
}

/// All outcomes of one batch run, in configuration order.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<MotorOutcome>,
    /// Threshold the run was evaluated with (cycles per sample).
    pub threshold: f64,
}

impl BatchReport {
    /// Number of motors successfully analyzed.
    pub fn analyzed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Number of motors skipped with a failure.
    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.analyzed_count()
    }

    /// Successfully analyzed motors with their ids.
    pub fn analyses(&self) -> impl Iterator<Item = (&str, &MotorAnalysis)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.analysis().map(|a| (o.motor_id.as_str(), a)))
    }

    /// Skipped motors with their failure reasons.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &AnalysisError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.failure().map(|e| (o.motor_id.as_str(), e)))
    }
}

/// Analyze every configured motor, skipping failures.
///
/// Motors are evaluated in parallel; outcome order matches the configured
/// motor list regardless of completion order.
pub fn run_batch(config: &AnalysisConfig) -> BatchReport {
    if config.input.motors.is_empty() {
        warn!("No motors configured — nothing to analyze");
    }

    let evaluator = PhaseHealthEvaluator::new(config.health.threshold);

    let outcomes: Vec<MotorOutcome> = config
        .input
        .motors
        .par_iter()
        .map(|motor_id| {
            let result = analyze_motor(config, &evaluator, motor_id);
            match &result {
                Ok(analysis) => {
                    info!(motor = %motor_id, verdict = %analysis.verdict.global, "Motor analyzed");
                }
                Err(e) => {
                    warn!(motor = %motor_id, error = %e, "Motor skipped");
                }
            }
            MotorOutcome {
                motor_id: motor_id.clone(),
                result,
            }
        })
        .collect();

    let report = BatchReport {
        outcomes,
        threshold: config.health.threshold,
    };

    info!(
        analyzed = report.analyzed_count(),
        skipped = report.skipped_count(),
        "Batch analysis complete"
    );

    report
}

/// Load one motor's recording and evaluate it.
fn analyze_motor(
    config: &AnalysisConfig,
    evaluator: &PhaseHealthEvaluator,
    motor_id: &str,
) -> Result<MotorAnalysis, AnalysisError> {
    let recording = WaveformRecording::load(config.recording_path(motor_id))?;
    let analysis = evaluator.evaluate(recording.phase_series())?;
    Ok(analysis)
}

// ============================================================================
// Tests
// ============================================================================
