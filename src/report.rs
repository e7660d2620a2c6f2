//! Report Rendering
//!
//! Writes the batch outcome to two artifacts:
//!
//! - a results-table CSV with one block of four rows per analyzed motor
//!   (phases A, B, C plus a Global row; the motor id appears on the first
//!   row of its block only), and
//! - a JSON report carrying the full per-phase statistics plus the skipped
//!   motors with their reasons, for downstream consumers.
//!
//! Plot rendering is a collaborator concern; the per-phase traces stay on
//! [`MotorAnalysis`](crate::types::MotorAnalysis) for anyone who needs them.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::batch::BatchReport;
use crate::types::{HealthStatus, MotorVerdict, PhaseVerdict};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Results-Table CSV
// ============================================================================

/// Render the results table: `Motor,Phase,Health,Standard deviation frequency`.
pub fn render_results_table(report: &BatchReport) -> String {
    let mut out = String::from("Motor,Phase,Health,Standard deviation frequency\n");

    for (motor_id, analysis) in report.analyses() {
        append_motor_block(&mut out, motor_id, &analysis.verdict);
    }

    out
}

fn append_motor_block(out: &mut String, motor_id: &str, verdict: &MotorVerdict) {
    for (i, row) in verdict.phases.iter().enumerate() {
        let id = if i == 0 { motor_id } else { "" };
        out.push_str(&format!(
            "{},{},{},{:e}\n",
            id, row.phase, row.status, row.stability_statistic
        ));
    }
    out.push_str(&format!(",Global,{},\n", verdict.global));
}

/// Write the results-table CSV to `path`.
pub fn write_results_table(report: &BatchReport, path: impl AsRef<Path>) -> Result<(), ReportError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(render_results_table(report).as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|source| ReportError::Io {
            path: path.display().to_string(),
            source,
        })?;

    info!(path = %path.display(), motors = report.analyzed_count(), "Results table written");
    Ok(())
}

// ============================================================================
// JSON Report
// ============================================================================

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    threshold: f64,
    motors: Vec<JsonMotor<'a>>,
    skipped: Vec<JsonSkipped<'a>>,
}

#[derive(Serialize)]
struct JsonMotor<'a> {
    motor_id: &'a str,
    global: HealthStatus,
    phases: &'a [PhaseVerdict; 3],
    analyzed_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct JsonSkipped<'a> {
    motor_id: &'a str,
    reason: String,
}

/// Render the JSON report as a pretty-printed string.
pub fn render_json(report: &BatchReport) -> Result<String, ReportError> {
    let doc = JsonReport {
        generated_at: Utc::now(),
        threshold: report.threshold,
        motors: report
            .analyses()
            .map(|(motor_id, analysis)| JsonMotor {
                motor_id,
                global: analysis.verdict.global,
                phases: &analysis.verdict.phases,
                analyzed_at: analysis.analyzed_at,
            })
            .collect(),
        skipped: report
            .failures()
            .map(|(motor_id, error)| JsonSkipped {
                motor_id,
                reason: error.to_string(),
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Write the JSON report to `path`.
pub fn write_json(report: &BatchReport, path: impl AsRef<Path>) -> Result<(), ReportError> {
    let path = path.as_ref();
    let contents = render_json(report)?;
    std::fs::write(path, contents).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    info!(path = %path.display(), skipped = report.skipped_count(), "JSON report written");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
