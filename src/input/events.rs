//! Generic input event types for cross-backend compatibility.

use serde::{Deserialize, Serialize};

/// Generic key representation for cross-backend compatibility.
///
/// Front-ends map their native key codes to these generic key values for
/// unified input handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Regular character key (a-z, 0-9, symbols)
    Char(char),
    /// Delete key
    Delete,
    /// Escape key
    Escape,
    /// Return/Enter key
    Return,
    /// Backspace key
    Backspace,
    /// Tab key
    Tab,
    /// Space bar
    Space,
    /// Shift modifier
    Shift,
    /// Ctrl modifier
    Ctrl,
    /// Alt/Option modifier
    Alt,
    /// Meta/Cmd/Super modifier
    Meta,
    /// Unmapped or unrecognized key
    Unknown,
}

impl Key {
    /// Parses a key name as written in keybindings ("z", "Delete", "Escape").
    pub fn from_name(name: &str) -> Self {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Key::Char(c);
        }
        match name.to_lowercase().as_str() {
            "delete" | "del" => Key::Delete,
            "escape" | "esc" => Key::Escape,
            "return" | "enter" => Key::Return,
            "backspace" => Key::Backspace,
            "tab" => Key::Tab,
            "space" => Key::Space,
            "shift" => Key::Shift,
            "ctrl" | "control" => Key::Ctrl,
            "alt" | "option" => Key::Alt,
            "meta" | "cmd" | "command" | "super" => Key::Meta,
            _ => Key::Unknown,
        }
    }

    /// Name used for keybinding lookup, or `None` for modifiers and unknown keys.
    pub fn binding_name(self) -> Option<String> {
        let name = match self {
            Key::Char(c) => return Some(c.to_lowercase().to_string()),
            Key::Delete => "delete",
            Key::Escape => "escape",
            Key::Return => "return",
            Key::Backspace => "backspace",
            Key::Tab => "tab",
            Key::Space => "space",
            Key::Shift | Key::Ctrl | Key::Alt | Key::Meta | Key::Unknown => return None,
        };
        Some(name.to_string())
    }
}

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Left mouse button (draws or pans depending on the tool)
    #[default]
    Left,
    /// Right mouse button (ignored)
    Right,
    /// Middle mouse button (always pans)
    Middle,
}
