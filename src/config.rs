//! Analysis Configuration
//!
//! Per-site configuration loaded from TOML files: the motor list, where
//! their waveform recordings live, the health threshold, and where reports
//! go. Nothing here is process-wide mutable state; the loaded config is
//! passed explicitly into the batch run.
//!
//! ## Loading Order
//!
//! 1. `MOTORGUARD_CONFIG` environment variable (path to TOML file)
//! 2. `motorguard.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Example
//!
//! ```toml
//! [input]
//! data_dir = "data/motors"
//! motors = ["EA0117AM", "EA0119AM", "PC0101CM"]
//!
//! [health]
//! threshold = 0.0001
//!
//! [report]
//! csv_path = "health_results.csv"
//! json_path = "health_results.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable naming an explicit config file path.
pub const CONFIG_ENV_VAR: &str = "MOTORGUARD_CONFIG";

/// Default config file name searched in the working directory.
pub const CONFIG_FILE_NAME: &str = "motorguard.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for an analysis run.
///
/// Load with [`AnalysisConfig::load`] which searches:
/// 1. `$MOTORGUARD_CONFIG` env var
/// 2. `./motorguard.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisConfig {
    /// Motor list and recording location
    #[serde(default)]
    pub input: InputConfig,

    /// Health decision rule tuning
    #[serde(default)]
    pub health: HealthConfig,

    /// Report output paths
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where recordings live and which motors to analyze.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory containing one `<motor_id>.csv` recording per motor.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Motor identifiers to analyze, in report order.
    #[serde(default)]
    pub motors: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            motors: Vec::new(),
        }
    }
}

/// Health decision rule tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Stability threshold in cycles per sample. A phase is Healthy when
    /// the standard deviation of its instantaneous frequency is below this.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

/// Report output paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Results-table CSV path.
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Full JSON report path.
    #[serde(default = "default_json_path")]
    pub json_path: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            json_path: default_json_path(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/motors")
}

fn default_threshold() -> f64 {
    crate::processing::DEFAULT_HEALTH_THRESHOLD
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("health_results.csv")
}

fn default_json_path() -> PathBuf {
    PathBuf::from("health_results.json")
}

impl AnalysisConfig {
    /// Load configuration using the standard search order:
    /// 1. `$MOTORGUARD_CONFIG` environment variable
    /// 2. `./motorguard.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), motors = config.input.motors.len(), "Loaded config from MOTORGUARD_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from MOTORGUARD_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "MOTORGUARD_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(motors = config.input.motors.len(), "Loaded config from ./motorguard.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./motorguard.toml, using defaults");
                }
            }
        }

        info!("No motorguard.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants a run depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.health.threshold.is_finite() || self.health.threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "health.threshold must be a positive finite number, got {}",
                self.health.threshold
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for motor in &self.input.motors {
            if motor.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "input.motors contains an empty motor id".to_string(),
                ));
            }
            if !seen.insert(motor.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "input.motors lists '{motor}' more than once"
                )));
            }
        }

        Ok(())
    }

    /// Path to a motor's recording CSV under the configured data directory.
    pub fn recording_path(&self, motor_id: &str) -> PathBuf {
        self.input.data_dir.join(format!("{motor_id}.csv"))
    }
}

// ============================================================================
// Tests
// ============================================================================
