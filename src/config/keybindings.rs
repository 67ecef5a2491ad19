//! Keybinding configuration types and parsing.
//!
//! Users can rebind every canvas command from the `[keybindings]` table.
//! `Meta` (Cmd on macOS) is tracked separately from `Ctrl` so both
//! platform conventions can be bound at once.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All possible actions that can be bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // History
    Undo,
    Redo,

    // Canvas commands
    Save,
    ClearCanvas,
    ResetView,

    // Tool selection
    SelectPen,
    SelectEraser,
    SelectPan,

    // Width controls
    IncreaseWidth,
    DecreaseWidth,
}

/// A single keybinding: a key with optional modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyBinding {
    /// Parse a keybinding string like "Ctrl+Shift+Z", "Meta+Y" or "Delete".
    ///
    /// Modifiers can appear in any order and spaces around '+' are ignored.
    /// The key is stored lowercase so "Ctrl+Z" and "ctrl+z" are the same binding.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty keybinding string".to_string());
        }

        let normalized = s.replace(" + ", "+").replace("+ ", "+").replace(" +", "+");
        let parts: Vec<&str> = normalized.split('+').collect();

        let mut ctrl = false;
        let mut shift = false;
        let mut alt = false;
        let mut meta = false;
        let mut key_parts = Vec::new();

        for part in parts {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => ctrl = true,
                "shift" => shift = true,
                "alt" | "option" => alt = true,
                "meta" | "cmd" | "command" | "super" => meta = true,
                _ => key_parts.push(part),
            }
        }

        if key_parts.is_empty() {
            return Err(format!("No key specified in: {}", s));
        }

        // "Ctrl++" splits into ["Ctrl", "", ""]: the empty tail is the '+' key
        let joined = key_parts.join("+");
        let key = if joined.trim_matches('+').is_empty() {
            "+".to_string()
        } else {
            joined.to_lowercase()
        };

        Ok(Self {
            key,
            ctrl,
            shift,
            alt,
            meta,
        })
    }

    /// Check if this keybinding matches the pressed key and modifiers.
    ///
    /// A symbol bound without Shift (such as `+` or `_`) also matches while
    /// Shift is held, since many layouts need Shift to type it.
    pub fn matches(&self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        let shift_ok = self.shift == shift || (!self.shift && self.is_symbol());
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == ctrl
            && shift_ok
            && self.alt == alt
            && self.meta == meta
    }

    fn is_symbol(&self) -> bool {
        let mut chars = self.key.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if !c.is_alphanumeric())
    }
}

/// Configuration for all keybindings.
///
/// Each action can have multiple keybindings:
/// ```toml
/// [keybindings]
/// undo = ["Ctrl+Z", "Meta+Z"]
/// redo = ["Ctrl+Shift+Z", "Ctrl+Y"]
/// clear_canvas = ["Delete"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeybindingsConfig {
    #[serde(default = "default_undo")]
    pub undo: Vec<String>,

    #[serde(default = "default_redo")]
    pub redo: Vec<String>,

    #[serde(default = "default_save")]
    pub save: Vec<String>,

    #[serde(default = "default_clear_canvas")]
    pub clear_canvas: Vec<String>,

    #[serde(default = "default_reset_view")]
    pub reset_view: Vec<String>,

    #[serde(default = "default_select_pen")]
    pub select_pen: Vec<String>,

    #[serde(default = "default_select_eraser")]
    pub select_eraser: Vec<String>,

    #[serde(default = "default_select_pan")]
    pub select_pan: Vec<String>,

    #[serde(default = "default_increase_width")]
    pub increase_width: Vec<String>,

    #[serde(default = "default_decrease_width")]
    pub decrease_width: Vec<String>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            undo: default_undo(),
            redo: default_redo(),
            save: default_save(),
            clear_canvas: default_clear_canvas(),
            reset_view: default_reset_view(),
            select_pen: default_select_pen(),
            select_eraser: default_select_eraser(),
            select_pan: default_select_pan(),
            increase_width: default_increase_width(),
            decrease_width: default_decrease_width(),
        }
    }
}

impl KeybindingsConfig {
    /// Build a lookup map from keybindings to actions for efficient matching.
    /// Returns an error if any keybinding string is invalid or if duplicates are detected.
    pub fn build_action_map(&self) -> Result<HashMap<KeyBinding, Action>, String> {
        let mut map = HashMap::new();

        let groups: [(&[String], Action); 10] = [
            (&self.undo, Action::Undo),
            (&self.redo, Action::Redo),
            (&self.save, Action::Save),
            (&self.clear_canvas, Action::ClearCanvas),
            (&self.reset_view, Action::ResetView),
            (&self.select_pen, Action::SelectPen),
            (&self.select_eraser, Action::SelectEraser),
            (&self.select_pan, Action::SelectPan),
            (&self.increase_width, Action::IncreaseWidth),
            (&self.decrease_width, Action::DecreaseWidth),
        ];

        for (bindings, action) in groups {
            for binding_str in bindings {
                let binding = KeyBinding::parse(binding_str)?;
                if let Some(existing_action) = map.insert(binding, action) {
                    return Err(format!(
                        "Duplicate keybinding '{}' assigned to both {:?} and {:?}",
                        binding_str, existing_action, action
                    ));
                }
            }
        }

        Ok(map)
    }
}

// =============================================================================
// Default keybinding functions
// =============================================================================

fn default_undo() -> Vec<String> {
    vec!["Ctrl+Z".to_string(), "Meta+Z".to_string()]
}

fn default_redo() -> Vec<String> {
    vec![
        "Ctrl+Shift+Z".to_string(),
        "Meta+Shift+Z".to_string(),
        "Ctrl+Y".to_string(),
        "Meta+Y".to_string(),
    ]
}

fn default_save() -> Vec<String> {
    vec!["Ctrl+S".to_string(), "Meta+S".to_string()]
}

fn default_clear_canvas() -> Vec<String> {
    vec!["Delete".to_string()]
}

fn default_reset_view() -> Vec<String> {
    vec!["0".to_string()]
}

fn default_select_pen() -> Vec<String> {
    vec!["P".to_string()]
}

fn default_select_eraser() -> Vec<String> {
    vec!["E".to_string()]
}

fn default_select_pan() -> Vec<String> {
    vec!["M".to_string()]
}

fn default_increase_width() -> Vec<String> {
    vec!["+".to_string(), "=".to_string()]
}

fn default_decrease_width() -> Vec<String> {
    vec!["-".to_string(), "_".to_string()]
}
