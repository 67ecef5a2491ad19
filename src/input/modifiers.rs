//! Keyboard modifier state tracking.

/// Keyboard modifier state.
///
/// Tracks which modifier keys are currently pressed. Used to match keyboard
/// shortcuts; Ctrl and Meta (Cmd) are kept apart so bindings can target either.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key pressed
    pub shift: bool,
    /// Ctrl key pressed
    pub ctrl: bool,
    /// Alt/Option key pressed
    pub alt: bool,
    /// Meta/Cmd/Super key pressed
    pub meta: bool,
}

impl Modifiers {
    /// Creates a new Modifiers instance with all keys released.
    pub fn new() -> Self {
        Self::default()
    }
}
