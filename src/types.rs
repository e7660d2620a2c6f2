//! Shared data structures for motor current health analysis
//!
//! This module defines the core types of the health pipeline:
//! - Phase labels and raw max/min current samples
//! - Per-phase verdicts with the stability statistic that produced them
//! - Motor-level aggregate verdicts
//! - Envelope / instantaneous-frequency traces for plotting consumers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Phase Labels
// ============================================================================

/// One of the three electrical phases of a motor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    A,
    B,
    C,
}

impl Phase {
    /// All three phases, in evaluation order.
    pub const ALL: [Phase; 3] = [Phase::A, Phase::B, Phase::C];

    /// Single-letter label used in reports and column headers.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::A => "A",
            Phase::B => "B",
            Phase::C => "C",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-phase averaged current series, keyed by phase label.
///
/// A `BTreeMap` keeps iteration in A, B, C order and makes an absent phase
/// representable (a recording whose source lacked one phase's columns).
pub type PhaseSeriesMap = std::collections::BTreeMap<Phase, Vec<f64>>;

// ============================================================================
// Raw Samples
// ============================================================================

/// One time-indexed max/min current observation for a single phase.
///
/// Recorders log the peak and trough current seen within each sampling
/// window; the analysis consumes their midpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PhaseCurrentSample {
    /// Maximum current over the sampling window (A)
    pub max_current: f64,
    /// Minimum current over the sampling window (A)
    pub min_current: f64,
}

impl PhaseCurrentSample {
    /// Averaged phase current: `(max + min) / 2`.
    pub fn phase_current(&self) -> f64 {
        (self.max_current + self.min_current) / 2.0
    }
}

// ============================================================================
// Verdicts
// ============================================================================

/// Health classification for a phase or a whole motor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "Healthy"),
            HealthStatus::Unhealthy => write!(f, "Unhealthy"),
        }
    }
}

/// Verdict for a single phase, retaining the statistic and threshold that
/// produced it so reporting consumers can render more than the label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseVerdict {
    pub phase: Phase,
    pub status: HealthStatus,
    /// Standard deviation of the instantaneous-frequency trace
    /// (cycles per sample).
    pub stability_statistic: f64,
    /// Threshold the statistic was compared against.
    pub threshold: f64,
}

/// Per-motor aggregate: three phase verdicts plus the global classification.
///
/// Immutable once computed; created fresh per motor per analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorVerdict {
    /// Verdicts for phases A, B, C in order.
    pub phases: [PhaseVerdict; 3],
    /// Healthy iff all three phase verdicts are Healthy.
    pub global: HealthStatus,
}

impl MotorVerdict {
    /// Verdict for a specific phase.
    pub fn phase(&self, phase: Phase) -> &PhaseVerdict {
        match phase {
            Phase::A => &self.phases[0],
            Phase::B => &self.phases[1],
            Phase::C => &self.phases[2],
        }
    }
}

// ============================================================================
// Traces
// ============================================================================

/// Envelope and instantaneous-frequency traces for one phase.
///
/// Same length as the input series; kept on the analysis result so a
/// plotting collaborator can render them without re-running the transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTrace {
    pub phase: Phase,
    /// Analytic-signal magnitude per sample (non-negative).
    pub envelope: Vec<f64>,
    /// Instantaneous frequency per sample (cycles per sample).
    pub instantaneous_frequency: Vec<f64>,
}

/// Full result of evaluating one motor: the verdict plus the intermediate
/// traces that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorAnalysis {
    pub verdict: MotorVerdict,
    /// Traces for phases A, B, C in order.
    pub traces: [PhaseTrace; 3],
    /// When the analysis ran.
    pub analyzed_at: DateTime<Utc>,
}

impl MotorAnalysis {
    /// Trace for a specific phase.
    pub fn trace(&self, phase: Phase) -> &PhaseTrace {
        match phase {
            Phase::A => &self.traces[0],
            Phase::B => &self.traces[1],
            Phase::C => &self.traces[2],
        }
    }
}
