//! Configuration type definitions.

use super::enums::{ColorSpec, SessionStorageMode};
use crate::input::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Content area settings.
///
/// The content buffer has a fixed logical size independent of the viewport
/// and of the zoom level.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CanvasConfig {
    /// Content buffer width in pixels (valid range: 1 - 8192)
    #[serde(default = "default_canvas_width")]
    pub width: i32,

    /// Content buffer height in pixels (valid range: 1 - 8192)
    #[serde(default = "default_canvas_height")]
    pub height: i32,

    /// Visual margin between the viewport origin and the content area at
    /// identity transform (valid range: 0.0 - 500.0)
    #[serde(default = "default_padding")]
    pub padding: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
            padding: default_padding(),
        }
    }
}

/// Drawing-related settings.
///
/// Controls the tool, color and width active when the canvas first opens.
/// Users can change these values at runtime using keybindings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrawingConfig {
    /// Tool selected at startup (pen, eraser, pan)
    #[serde(default)]
    pub default_tool: Tool,

    /// Default stroke color - a named color, a hex string like `"#ff0000"`,
    /// or an RGB array like `[255, 0, 0]`
    #[serde(default = "default_color")]
    pub default_color: ColorSpec,

    /// Default stroke width in screen pixels (valid range: 1.0 - 100.0)
    #[serde(default = "default_width")]
    pub default_width: f64,

    /// Amount added or removed by the width keybindings
    #[serde(default = "default_width_step")]
    pub width_step: f64,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            default_tool: Tool::default(),
            default_color: default_color(),
            default_width: default_width(),
            width_step: default_width_step(),
        }
    }
}

/// Pan/zoom settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ViewConfig {
    /// Scale change per wheel delta unit (valid range: 0.00001 - 0.1)
    #[serde(default = "default_zoom_sensitivity")]
    pub zoom_sensitivity: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            zoom_sensitivity: default_zoom_sensitivity(),
        }
    }
}

/// Undo/redo settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept for undo; 0 keeps everything
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

/// Saved canvas settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionConfig {
    /// Where the slot file lives (auto, config, custom)
    #[serde(default)]
    pub storage: SessionStorageMode,

    /// Directory used when `storage = "custom"`; `~` is expanded
    #[serde(default)]
    pub custom_directory: Option<String>,

    /// Slot key; becomes the file name of the saved canvas
    #[serde(default = "default_slot")]
    pub slot: String,

    /// Restore the saved canvas on startup
    #[serde(default = "default_true")]
    pub restore_on_start: bool,

    /// Refuse to read or write slot files larger than this (valid range: 1 - 1024)
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// Keep the previous save as a `.bak` file (0 disables)
    #[serde(default = "default_backup_retention")]
    pub backup_retention: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage: SessionStorageMode::default(),
            custom_directory: None,
            slot: default_slot(),
            restore_on_start: default_true(),
            max_file_size_mb: default_max_file_size_mb(),
            backup_retention: default_backup_retention(),
        }
    }
}

/// Image export settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportConfig {
    /// Directory for exported images; `~` is expanded
    #[serde(default = "default_export_directory")]
    pub directory: String,

    /// File name template using chrono format specifiers
    #[serde(default = "default_filename_template")]
    pub filename_template: String,

    /// Default format ("png" or "jpeg")
    #[serde(default = "default_export_format")]
    pub format: String,

    /// JPEG quality (valid range: 1 - 100); ignored for PNG
    #[serde(default = "default_quality")]
    pub quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
            filename_template: default_filename_template(),
            format: default_export_format(),
            quality: default_quality(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_canvas_width() -> i32 {
    1200
}

fn default_canvas_height() -> i32 {
    800
}

fn default_padding() -> f64 {
    crate::view::DEFAULT_PADDING
}

fn default_color() -> ColorSpec {
    ColorSpec::Name("black".to_string())
}

fn default_width() -> f64 {
    5.0
}

fn default_width_step() -> f64 {
    1.0
}

fn default_zoom_sensitivity() -> f64 {
    crate::view::DEFAULT_ZOOM_SENSITIVITY
}

fn default_max_entries() -> usize {
    crate::history::DEFAULT_MAX_ENTRIES
}

fn default_slot() -> String {
    crate::session::DEFAULT_SLOT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_file_size_mb() -> u64 {
    64
}

fn default_backup_retention() -> usize {
    1
}

fn default_export_directory() -> String {
    "~/Pictures/Doodlepad".to_string()
}

fn default_filename_template() -> String {
    "doodle_%Y-%m-%d_%H%M%S".to_string()
}

fn default_export_format() -> String {
    "png".to_string()
}

fn default_quality() -> u8 {
    92
}
