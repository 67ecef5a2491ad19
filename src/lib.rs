//! Library exports for embedding the doodlepad canvas.
//!
//! A front-end owns a [`input::InputState`], feeds it pointer, wheel and key
//! events, and calls [`input::InputState::render`] into its own Cairo surface
//! whenever `needs_redraw` is set. The `doodlepad` binary drives the same
//! controller from replay scripts.

pub mod config;
pub mod draw;
pub mod export;
pub mod history;
pub mod input;
pub mod replay;
pub mod session;
pub mod util;
pub mod view;

pub use config::Config;
