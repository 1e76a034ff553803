//! Configuration module for the silica predictor.

use crate::error::{Result, SilicaError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for a predictor session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SilicaConfig {
    /// Model artifact configuration.
    pub model: ModelSettings,
    /// Input control configuration.
    pub controls: ControlsConfig,
    /// Observability configuration.
    pub observability: ObservabilityConfig,
}

impl SilicaConfig {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SilicaError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| SilicaError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.model.path.as_os_str().is_empty() {
            return Err(SilicaError::InvalidConfig {
                field: "model.path".to_string(),
                reason: "Model artifact path must not be empty".to_string(),
            });
        }

        for (field, spec) in [
            ("controls.iron", &self.controls.iron),
            ("controls.air", &self.controls.air),
            ("controls.amine", &self.controls.amine),
        ] {
            spec.validate(field)?;
        }

        Ok(())
    }

    /// Create a development configuration with the artifact in the
    /// working directory.
    pub fn development() -> Self {
        Self::default()
    }
}

/// Model artifact settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Filesystem path to the serialized regression artifact.
    pub path: PathBuf,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("modelo.bin"),
        }
    }
}

/// One bounded numeric control.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ControlSpec {
    /// Minimum accepted value.
    pub min: f64,
    /// Maximum accepted value.
    pub max: f64,
    /// Initial value presented to the operator.
    pub initial: f64,
    /// Adjustment step granularity.
    pub step: f64,
}

impl ControlSpec {
    /// Clamp a value into the control's range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    fn validate(&self, field: &str) -> Result<()> {
        if !(self.min < self.max) {
            return Err(SilicaError::InvalidConfig {
                field: field.to_string(),
                reason: format!("min {} must be below max {}", self.min, self.max),
            });
        }
        if !(self.step > 0.0) {
            return Err(SilicaError::InvalidConfig {
                field: field.to_string(),
                reason: format!("step {} must be positive", self.step),
            });
        }
        Ok(())
    }
}

/// The three operator input controls.
///
/// Bounds come from the operating envelope of the flotation plant the model
/// was trained on. Initial values are kept as exported even where they do
/// not fall on the step grid; assignments are clamped into range instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsConfig {
    /// Iron concentrate (%)
    pub iron: ControlSpec,
    /// Flotation column 01 air flow
    pub air: ControlSpec,
    /// Amine reagent flow
    pub amine: ControlSpec,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            iron: ControlSpec {
                min: 62.05,
                max: 68.01,
                initial: 65.0,
                step: 0.1,
            },
            air: ControlSpec {
                min: 175.84734,
                max: 372.44264,
                initial: 200.0,
                step: 0.1,
            },
            amine: ControlSpec {
                min: 241.70237,
                max: 739.304,
                initial: 350.0,
                step: 0.1,
            },
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level filter (tracing syntax).
    pub log_level: String,
    /// Emit logs as JSON.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
