// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runtime configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Error raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables of the frame loop, camera and pointer dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Smallest allowed zoom scale
    pub min_zoom: f32,
    /// Largest allowed zoom scale
    pub max_zoom: f32,
    /// Wheel pixels to zoom factor
    pub wheel_sensitivity: f32,
    /// Upper bound on rendered frames per second
    pub frame_rate_cap: u32,
    /// Background grid cell size in world units
    pub grid_spacing: f32,
    /// Post the pointer world position to the debug overlay every tick
    pub debug_pointer: bool,
    /// Post the camera frustum edges to the debug overlay every tick
    pub debug_camera: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 2.0,
            wheel_sensitivity: 0.001,
            frame_rate_cap: 60,
            grid_spacing: 20.0,
            debug_pointer: false,
            debug_camera: false,
        }
    }
}

impl RuntimeConfig {
    /// Parse a RON document and validate it
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("wheel_sensitivity", self.wheel_sensitivity),
            ("grid_spacing", self.grid_spacing),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
            }
        }
        if self.min_zoom <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_zoom must be positive, got {}",
                self.min_zoom
            )));
        }
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.frame_rate_cap == 0 {
            return Err(ConfigError::Invalid("frame_rate_cap must be at least 1".to_string()));
        }
        if self.grid_spacing <= 0.0 {
            return Err(ConfigError::Invalid("grid_spacing must be positive".to_string()));
        }
        Ok(())
    }

    /// Minimum time between two accepted frames, in seconds
    pub fn frame_interval(&self) -> f64 {
        1.0 / f64::from(self.frame_rate_cap.max(1))
    }
}
