//! Pan/zoom view transform.
//!
//! Maps between screen space (pointer coordinates relative to the viewport)
//! and content space (pixel coordinates inside the content buffer). The
//! content buffer is drawn at a fixed `padding` offset inside the transformed
//! viewport, so the full mapping is:
//!
//! ```text
//! screen = (content + padding) * scale + offset
//! content = (screen - offset) / scale - padding
//! ```

use log::debug;

/// Smallest allowed zoom factor.
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed zoom factor.
pub const MAX_SCALE: f64 = 10.0;
/// Scale change per unit of wheel delta.
pub const DEFAULT_ZOOM_SENSITIVITY: f64 = 0.001;
/// Margin between the viewport origin and the content buffer, in content units.
pub const DEFAULT_PADDING: f64 = 25.0;

/// Current pan offset and zoom scale of the viewport.
///
/// The offset is deliberately unclamped: content may be panned fully out of
/// view. The scale always stays within [`MIN_SCALE`, `MAX_SCALE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    offset_x: f64,
    offset_y: f64,
    scale: f64,
    padding: f64,
    sensitivity: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(DEFAULT_PADDING, DEFAULT_ZOOM_SENSITIVITY)
    }
}

impl ViewTransform {
    /// Creates an identity transform (no pan, scale 1.0).
    pub fn new(padding: f64, sensitivity: f64) -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
            padding,
            sensitivity,
        }
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Converts a screen-space point to content space.
    pub fn to_content(&self, screen_x: f64, screen_y: f64) -> (f64, f64) {
        (
            (screen_x - self.offset_x) / self.scale - self.padding,
            (screen_y - self.offset_y) / self.scale - self.padding,
        )
    }

    /// Converts a content-space point back to screen space.
    pub fn to_screen(&self, content_x: f64, content_y: f64) -> (f64, f64) {
        (
            (content_x + self.padding) * self.scale + self.offset_x,
            (content_y + self.padding) * self.scale + self.offset_y,
        )
    }

    /// Zooms by `delta * sensitivity` keeping the content point under the
    /// given screen position fixed.
    ///
    /// Returns `true` when the scale actually changed.
    pub fn zoom_at(&mut self, screen_x: f64, screen_y: f64, delta: f64) -> bool {
        let old_scale = self.scale;
        let new_scale = (old_scale + delta * self.sensitivity).clamp(MIN_SCALE, MAX_SCALE);
        if new_scale == old_scale {
            return false;
        }

        let ratio = new_scale / old_scale;
        self.offset_x = screen_x - (screen_x - self.offset_x) * ratio;
        self.offset_y = screen_y - (screen_y - self.offset_y) * ratio;
        self.scale = new_scale;

        debug!(
            "Zoomed to {:.3} around ({:.1}, {:.1})",
            self.scale, screen_x, screen_y
        );
        true
    }

    /// Moves the view by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Places the view offset at an absolute screen position.
    pub fn set_offset(&mut self, x: f64, y: f64) {
        self.offset_x = x;
        self.offset_y = y;
    }

    /// Sets the scale directly (clamped), leaving the offset untouched.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Returns to no pan and scale 1.0.
    pub fn reset(&mut self) {
        self.offset_x = 0.0;
        self.offset_y = 0.0;
        self.scale = 1.0;
    }

    /// Cairo affine matrix for this transform (scale, then translate).
    pub fn matrix(&self) -> cairo::Matrix {
        cairo::Matrix::new(self.scale, 0.0, 0.0, self.scale, self.offset_x, self.offset_y)
    }
}
