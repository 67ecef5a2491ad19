//! Input handling and the interaction state machine.
//!
//! This module translates front-end pointer, wheel and keyboard events into
//! drawing, view and history operations. It owns the current tool, tracks
//! modifiers, and switches between idle, drawing and panning modes.

pub mod events;
pub mod modifiers;
pub mod state;
pub mod tool;

// Re-export commonly used types at module level
pub use events::{Key, MouseButton};
pub use modifiers::Modifiers;
pub use state::{CursorStyle, InputState, InteractionState};
pub use tool::Tool;
