//! Configuration file support for doodlepad.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/doodlepad/config.toml`. Settings include the content area size,
//! drawing defaults, zoom sensitivity, history depth, the saved canvas slot, export
//! preferences, and keybindings.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod keybindings;
pub mod types;

// Re-export commonly used types at module level
pub use enums::{ColorSpec, SessionStorageMode};
pub use keybindings::{Action, KeyBinding, KeybindingsConfig};
pub use types::{
    CanvasConfig, DrawingConfig, ExportConfig, HistoryConfig, SessionConfig, ViewConfig,
};

use crate::draw::surface::{MAX_STROKE_WIDTH, MIN_STROKE_WIDTH};
use crate::export::ExportFormat;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_CANVAS_DIMENSION: i32 = crate::draw::snapshot::MAX_CANVAS_DIMENSION as i32;

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [canvas]
/// width = 1600
/// height = 900
///
/// [drawing]
/// default_color = "#ff0000"
/// default_width = 8.0
///
/// [view]
/// zoom_sensitivity = 0.002
///
/// [history]
/// max_entries = 50
///
/// [export]
/// format = "jpeg"
/// quality = 85
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Content area size and margin
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Drawing tool defaults (tool, color, width)
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Pan/zoom behaviour
    #[serde(default)]
    pub view: ViewConfig,

    /// Undo/redo depth
    #[serde(default)]
    pub history: HistoryConfig,

    /// Saved canvas slot
    #[serde(default)]
    pub session: SessionConfig,

    /// Image export defaults
    #[serde(default)]
    pub export: ExportConfig,

    /// Keyboard shortcuts
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value (or reset to the
    /// default) and a warning is logged.
    ///
    /// Validated ranges:
    /// - `canvas.width`, `canvas.height`: 1 - 8192
    /// - `canvas.padding`: 0.0 - 500.0
    /// - `drawing.default_width`: 1.0 - 100.0
    /// - `drawing.width_step`: 0.1 - 50.0
    /// - `view.zoom_sensitivity`: 0.00001 - 0.1
    /// - `session.max_file_size_mb`: 1 - 1024
    /// - `export.quality`: 1 - 100
    pub fn validate_and_clamp(&mut self) {
        if !(1..=MAX_CANVAS_DIMENSION).contains(&self.canvas.width) {
            warn!(
                "Invalid canvas width {}, clamping to 1-{} range",
                self.canvas.width, MAX_CANVAS_DIMENSION
            );
            self.canvas.width = self.canvas.width.clamp(1, MAX_CANVAS_DIMENSION);
        }

        if !(1..=MAX_CANVAS_DIMENSION).contains(&self.canvas.height) {
            warn!(
                "Invalid canvas height {}, clamping to 1-{} range",
                self.canvas.height, MAX_CANVAS_DIMENSION
            );
            self.canvas.height = self.canvas.height.clamp(1, MAX_CANVAS_DIMENSION);
        }

        if !(0.0..=500.0).contains(&self.canvas.padding) {
            warn!(
                "Invalid canvas padding {:.1}, clamping to 0.0-500.0 range",
                self.canvas.padding
            );
            self.canvas.padding = if self.canvas.padding.is_nan() {
                crate::view::DEFAULT_PADDING
            } else {
                self.canvas.padding.clamp(0.0, 500.0)
            };
        }

        if !(MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH).contains(&self.drawing.default_width) {
            warn!(
                "Invalid default_width {:.1}, clamping to {:.1}-{:.1} range",
                self.drawing.default_width, MIN_STROKE_WIDTH, MAX_STROKE_WIDTH
            );
            self.drawing.default_width = if self.drawing.default_width.is_nan() {
                DrawingConfig::default().default_width
            } else {
                self.drawing
                    .default_width
                    .clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
            };
        }

        if !(0.1..=50.0).contains(&self.drawing.width_step) {
            warn!(
                "Invalid width_step {:.2}, clamping to 0.1-50.0 range",
                self.drawing.width_step
            );
            self.drawing.width_step = if self.drawing.width_step.is_nan() {
                DrawingConfig::default().width_step
            } else {
                self.drawing.width_step.clamp(0.1, 50.0)
            };
        }

        if !(0.00001..=0.1).contains(&self.view.zoom_sensitivity) {
            warn!(
                "Invalid zoom_sensitivity {}, clamping to 0.00001-0.1 range",
                self.view.zoom_sensitivity
            );
            self.view.zoom_sensitivity = if self.view.zoom_sensitivity.is_nan() {
                crate::view::DEFAULT_ZOOM_SENSITIVITY
            } else {
                self.view.zoom_sensitivity.clamp(0.00001, 0.1)
            };
        }

        if !(1..=1024).contains(&self.session.max_file_size_mb) {
            warn!(
                "Invalid session max_file_size_mb {}, clamping to 1-1024 range",
                self.session.max_file_size_mb
            );
            self.session.max_file_size_mb = self.session.max_file_size_mb.clamp(1, 1024);
        }

        if !(1..=100).contains(&self.export.quality) {
            warn!(
                "Invalid export quality {}, clamping to 1-100 range",
                self.export.quality
            );
            self.export.quality = self.export.quality.clamp(1, 100);
        }

        if let Err(err) = self.export.format.parse::<ExportFormat>() {
            warn!("{}, falling back to 'png'", err);
            self.export.format = ExportFormat::Png.as_str().to_string();
        }
    }

    /// Returns the directory holding the configuration file
    /// (`~/.config/doodlepad` on Linux).
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn config_directory() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Could not find config directory")?
            .join("doodlepad"))
    }

    /// Returns the path to the configuration file.
    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_directory()?.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from an explicit path, falling back to defaults
    /// when the file does not exist.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let config = Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(text)?;
        config.validate_and_clamp();
        Ok(config)
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}
