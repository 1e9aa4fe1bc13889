// SPDX-License-Identifier: MIT OR Apache-2.0
//! Application configuration and errors.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use wirecanvas_graph::NodeLayoutConfig;
use wirecanvas_runtime::{ConfigError, RuntimeConfig};

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "wirecanvas.ron";

/// Application errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Window creation failed
    #[error("Failed to create window: {0}")]
    WindowCreation(String),

    /// Renderer initialization failed
    #[error("Failed to initialize renderer: {0}")]
    RendererInit(String),

    /// Event loop error
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for application operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Everything the binary can be configured with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Window title
    pub title: String,
    /// Initial window width in logical pixels
    pub width: u32,
    /// Initial window height in logical pixels
    pub height: u32,
    /// Place the demo nodes on the canvas at startup
    pub seed_demo_graph: bool,
    /// Show the debug overlay window
    pub show_overlay: bool,
    /// Frame loop, camera and pointer settings
    pub runtime: RuntimeConfig,
    /// Node box spacing and sizes
    pub layout: NodeLayoutConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Wirecanvas".to_string(),
            width: 1280,
            height: 800,
            seed_demo_graph: true,
            show_overlay: true,
            runtime: RuntimeConfig::default(),
            layout: NodeLayoutConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a RON document and validate the runtime section
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(ConfigError::from)?;
        config.runtime.validate()?;
        Ok(config)
    }

    /// Load a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        Self::from_ron_str(&source)
    }

    /// Pick the configuration file: an explicit path, else [`DEFAULT_CONFIG_FILE`] if present
    pub fn locate(arg: Option<PathBuf>) -> Option<PathBuf> {
        arg.or_else(|| {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            fallback.is_file().then_some(fallback)
        })
    }

    /// Load from the first command line argument or the default file, falling back to defaults
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self> {
        match Self::locate(args.nth(1).map(PathBuf::from)) {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => {
                tracing::debug!("No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = AppConfig::from_ron_str("(title: \"Canvas\", runtime: (max_zoom: 8.0))").unwrap();
        assert_eq!(config.title, "Canvas");
        assert_eq!(config.width, 1280);
        assert_eq!(config.runtime.max_zoom, 8.0);
        assert_eq!(config.runtime.min_zoom, 0.1);
        assert_eq!(config.layout, NodeLayoutConfig::default());
    }

    #[test]
    fn test_invalid_runtime_section_is_rejected() {
        let result = AppConfig::from_ron_str("(runtime: (frame_rate_cap: 0))");
        assert!(matches!(result, Err(AppError::Config(ConfigError::Invalid(_)))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = AppConfig::load(Path::new("does/not/exist.ron"));
        assert!(matches!(result, Err(AppError::Config(ConfigError::Io(_)))));
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = PathBuf::from("custom.ron");
        assert_eq!(AppConfig::locate(Some(path.clone())), Some(path));
    }
}
