mod actions;
mod core;
mod mouse;
mod render;
#[cfg(test)]
mod tests;

pub use self::core::{InputState, InteractionState};
pub use render::CursorStyle;
