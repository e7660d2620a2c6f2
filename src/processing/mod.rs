//! Signal processing module - analytic-signal transform and health evaluation

mod analytic;
mod evaluator;

pub use analytic::{analytic_signal, AnalyticSignalResult, AnalyticSignalTransform};
pub use evaluator::{EvaluationError, PhaseHealthEvaluator, DEFAULT_HEALTH_THRESHOLD};

use thiserror::Error;

/// Errors in signal processing
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Insufficient samples: need at least {needed}, have {available}")]
    InsufficientSamples { needed: usize, available: usize },

    #[error("Non-finite sample at index {index}")]
    NonFiniteSample { index: usize },

    #[error("Signal length {actual} does not match transform size {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}
