//! Configuration enum types.

use crate::draw::{BLACK, Color};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Color specification - either a color string or RGB values.
///
/// # Examples
/// ```toml
/// # Named color
/// default_color = "red"
///
/// # Hex color as produced by a color picker
/// default_color = "#ff8800"
///
/// # Custom RGB color (0-255 per component)
/// default_color = [255, 128, 0]  # Orange
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color (red, green, blue, yellow, orange, pink, white, black)
    /// or a hex string (`#rgb`, `#rrggbb`, `#rrggbbaa`)
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Converts the color specification to a [`Color`] struct.
    ///
    /// Unknown names and malformed hex strings fall back to black with a warning.
    pub fn to_color(&self) -> Color {
        match self {
            ColorSpec::Name(name) => Color::parse(name).unwrap_or_else(|err| {
                warn!("{}, using black", err);
                BLACK
            }),
            ColorSpec::Rgb([r, g, b]) => Color::from_rgb8(*r, *g, *b),
        }
    }
}

/// Where the saved canvas slot lives on disk.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStorageMode {
    /// Platform data directory (`~/.local/share/doodlepad` on Linux)
    #[default]
    Auto,
    /// Next to the config file
    Config,
    /// `session.custom_directory`
    Custom,
}
