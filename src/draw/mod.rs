//! Raster drawing primitives (Cairo-based).
//!
//! This module defines the core drawing types:
//! - [`Color`]: RGBA color representation with predefined color constants
//! - [`DrawingSurface`]: the offscreen content buffer and stroke lifecycle
//! - [`Snapshot`]: lossless serialized images of the content buffer
//! - Rendering functions compositing the buffer into viewports

pub mod color;
pub mod render;
pub mod snapshot;
pub mod surface;

pub use color::{Color, ParseColorError};
pub use render::render_viewport;
pub use snapshot::{DecodedImage, Snapshot, SnapshotError};
pub use surface::{DrawingSurface, SurfaceError, ToolConfig};

pub use color::{BLACK, BLUE, GREEN, ORANGE, PINK, RED, WHITE, YELLOW};
