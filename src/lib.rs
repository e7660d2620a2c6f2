//! Motorguard: Motor Current Health Analysis
//!
//! Classifies the operating health of three-phase electric motors from
//! recorded current waveforms.
//!
//! ## Pipeline
//!
//! - **Analytic Signal Transform**: envelope and instantaneous frequency of
//!   each phase's averaged current series, via the discrete Hilbert transform
//! - **Phase Health Evaluator**: instantaneous-frequency stability per phase,
//!   aggregated to a motor-level Healthy/Unhealthy verdict
//! - **Batch Analysis**: parallel evaluation of a configured motor list with
//!   per-motor skip-and-continue
//! - **Reports**: results-table CSV and JSON artifacts for downstream use

pub mod batch;
pub mod config;
pub mod processing;
pub mod report;
pub mod types;
pub mod waveform;

// Re-export configuration
pub use config::{AnalysisConfig, ConfigError};

// Re-export commonly used types
pub use types::{
    HealthStatus, MotorAnalysis, MotorVerdict, Phase, PhaseCurrentSample, PhaseSeriesMap,
    PhaseTrace, PhaseVerdict,
};

// Re-export the processing pipeline
pub use processing::{
    analytic_signal, AnalyticSignalResult, AnalyticSignalTransform, EvaluationError,
    PhaseHealthEvaluator, ProcessingError, DEFAULT_HEALTH_THRESHOLD,
};

// Re-export batch orchestration
pub use batch::{run_batch, AnalysisError, BatchReport, MotorOutcome};

// Re-export waveform loading
pub use waveform::{WaveformError, WaveformRecording};
