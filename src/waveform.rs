//! Per-Motor Waveform Recording Adapter
//!
//! Parses recorded three-phase current waveforms (CSV format) into the
//! per-phase averaged series the evaluator consumes. Each motor's recording
//! is one CSV file whose header carries a max/min column pair per phase:
//!
//! ```text
//! Time,A(A) Max,A(A) Min,B(A) Max,B(A) Min,C(A) Max,C(A) Min
//! ```
//!
//! The adapter locates the column pairs from the header row, averages each
//! max/min pair into a single phase-current value per row, and tolerates
//! malformed rows (counted and logged, never silently coerced). A phase
//! whose column pair is absent from the header is simply absent from the
//! resulting series map; the evaluator reports it as a missing phase.
//!
//! # Usage
//!
//! ```ignore
//! use motorguard::waveform::WaveformRecording;
//!
//! let recording = WaveformRecording::load("data/motors/EA0117AM.csv")?;
//! let analysis = evaluator.evaluate(recording.phase_series())?;
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::types::{Phase, PhaseCurrentSample, PhaseSeriesMap};

/// Errors loading a waveform recording.
#[derive(Error, Debug)]
pub enum WaveformError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Empty recording: {0}")]
    EmptyFile(String),

    #[error("No phase columns found in {path} header")]
    NoPhaseColumns { path: String },

    #[error("No usable samples in {path} ({error_rows} rows failed to parse)")]
    NoSamples { path: String, error_rows: usize },
}

// ============================================================================
// Header Column Map
// ============================================================================

/// Column indices for one phase's max/min pair.
#[derive(Debug, Clone, Copy)]
struct PhaseColumns {
    max: usize,
    min: usize,
}

/// Maps phases to their column positions, built from the CSV header row.
#[derive(Debug, Clone)]
struct ColumnMap {
    phases: Vec<(Phase, PhaseColumns)>,
}

impl ColumnMap {
    /// Locate each phase's `X(A) Max` / `X(A) Min` column pair.
    ///
    /// A phase counts as present only when both columns are found; a lone
    /// max or min column is ignored.
    fn from_header(header: &str) -> Self {
        let cells: Vec<&str> = header.split(',').map(str::trim).collect();
        let find = |name: &str| cells.iter().position(|&c| c == name);

        let mut phases = Vec::with_capacity(3);
        for phase in Phase::ALL {
            let max_name = format!("{}(A) Max", phase.label());
            let min_name = format!("{}(A) Min", phase.label());
            if let (Some(max), Some(min)) = (find(&max_name), find(&min_name)) {
                phases.push((phase, PhaseColumns { max, min }));
            }
        }

        Self { phases }
    }

    fn missing_phases(&self) -> Vec<Phase> {
        Phase::ALL
            .iter()
            .copied()
            .filter(|p| !self.phases.iter().any(|(q, _)| q == p))
            .collect()
    }
}

// ============================================================================
// Waveform Recording
// ============================================================================

/// Metadata about a loaded recording.
#[derive(Debug, Clone)]
pub struct RecordingInfo {
    /// Motor identifier (from the file stem).
    pub motor_id: String,
    /// Source file path.
    pub source_path: String,
    /// Number of valid rows loaded.
    pub sample_count: usize,
    /// Number of rows that failed to parse.
    pub error_rows: usize,
    /// Phases whose column pairs were absent from the header.
    pub missing_phases: Vec<Phase>,
}

/// A motor's recording, averaged into per-phase current series.
///
/// All present phases have series of identical length and index ordering:
/// a row that fails to parse for any phase is dropped for every phase.
#[derive(Debug)]
pub struct WaveformRecording {
    phase_series: PhaseSeriesMap,
    pub info: RecordingInfo,
}

impl WaveformRecording {
    /// Load a recording CSV and average max/min pairs into phase series.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WaveformError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let file = File::open(path).map_err(|source| WaveformError::Io {
            path: path_str.clone(),
            source,
        })?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header_line = lines
            .next()
            .ok_or_else(|| WaveformError::EmptyFile(path_str.clone()))?
            .map_err(|source| WaveformError::Io {
                path: path_str.clone(),
                source,
            })?;

        let col_map = ColumnMap::from_header(&header_line);
        if col_map.phases.is_empty() {
            return Err(WaveformError::NoPhaseColumns { path: path_str });
        }

        let motor_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let mut phase_series: PhaseSeriesMap = col_map
            .phases
            .iter()
            .map(|(phase, _)| (*phase, Vec::new()))
            .collect();
        let mut errors = 0usize;
        let mut line_num = 1usize;

        for line_result in lines {
            line_num += 1;

            let line = match line_result {
                Ok(l) => l,
                Err(e) => {
                    tracing::warn!(line = line_num, error = %e, "Error reading line");
                    errors += 1;
                    continue;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match parse_row(&line, &col_map) {
                Ok(samples) => {
                    for ((phase, _), sample) in col_map.phases.iter().zip(samples) {
                        if let Some(series) = phase_series.get_mut(phase) {
                            series.push(sample.phase_current());
                        }
                    }
                }
                Err(e) => {
                    if errors < 10 {
                        tracing::warn!(line = line_num, error = %e, "Parse error");
                    }
                    errors += 1;
                }
            }
        }

        let sample_count = phase_series.values().next().map_or(0, Vec::len);
        if sample_count == 0 {
            return Err(WaveformError::NoSamples {
                path: path_str,
                error_rows: errors,
            });
        }

        let info = RecordingInfo {
            motor_id,
            source_path: path_str,
            sample_count,
            error_rows: errors,
            missing_phases: col_map.missing_phases(),
        };

        tracing::info!(
            motor = %info.motor_id,
            samples = info.sample_count,
            errors = info.error_rows,
            missing_phases = ?info.missing_phases,
            "Waveform recording loaded"
        );

        Ok(Self { phase_series, info })
    }

    /// Per-phase averaged current series.
    pub fn phase_series(&self) -> &PhaseSeriesMap {
        &self.phase_series
    }

    /// Consume and return the owned series map.
    pub fn into_phase_series(self) -> PhaseSeriesMap {
        self.phase_series
    }
}

/// Parse one data row into a max/min sample per mapped phase.
///
/// The whole row is rejected if any mapped cell is absent, non-numeric, or
/// non-finite, keeping the per-phase series aligned sample-for-sample.
fn parse_row(line: &str, col_map: &ColumnMap) -> Result<Vec<PhaseCurrentSample>, String> {
    let cells: Vec<&str> = line.split(',').map(str::trim).collect();

    let mut samples = Vec::with_capacity(col_map.phases.len());
    for (phase, cols) in &col_map.phases {
        let max_current = parse_cell(&cells, cols.max, *phase, "Max")?;
        let min_current = parse_cell(&cells, cols.min, *phase, "Min")?;
        samples.push(PhaseCurrentSample {
            max_current,
            min_current,
        });
    }
    Ok(samples)
}

fn parse_cell(cells: &[&str], index: usize, phase: Phase, kind: &str) -> Result<f64, String> {
    let raw = cells
        .get(index)
        .ok_or_else(|| format!("Missing {phase}(A) {kind} cell"))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("Bad {phase}(A) {kind} value '{raw}'"))?;
    if !value.is_finite() {
        return Err(format!("Non-finite {phase}(A) {kind} value '{raw}'"));
    }
    Ok(value)
}

// ============================================================================
// Tests
// ============================================================================
