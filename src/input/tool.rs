//! Drawing tool selection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Drawing tool selection.
///
/// The active tool decides what a primary-button drag does: paint, erase, or
/// move the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Freehand painting with the current color (source-over compositing)
    #[default]
    Pen,
    /// Freehand erasing; cuts out existing content down to transparency
    Eraser,
    /// Drag to pan the view; never touches the content buffer
    #[serde(alias = "move")]
    Pan,
}

impl Tool {
    /// Whether this tool writes into the content buffer.
    pub fn draws(self) -> bool {
        match self {
            Tool::Pen | Tool::Eraser => true,
            Tool::Pan => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Pen => "pen",
            Tool::Eraser => "eraser",
            Tool::Pan => "pan",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pen" => Ok(Tool::Pen),
            "eraser" => Ok(Tool::Eraser),
            // "move" is what the toolbar button was called
            "pan" | "move" => Ok(Tool::Pan),
            other => Err(format!("unknown tool '{other}' (expected pen, eraser or pan)")),
        }
    }
}
