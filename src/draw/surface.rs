//! Offscreen content buffer and stroke rasterization.

use super::color::{BLACK, Color};
use super::render;
use super::snapshot::{MAX_CANVAS_DIMENSION, Snapshot, SnapshotError};
use crate::input::Tool;
use crate::view::ViewTransform;
use cairo::{Context, Format, ImageSurface, LineCap, LineJoin, Operator};
use log::{debug, warn};
use thiserror::Error;

/// Thinnest stroke width accepted by [`DrawingSurface::set_style`].
pub const MIN_STROKE_WIDTH: f64 = 1.0;
/// Widest stroke width accepted by [`DrawingSurface::set_style`].
pub const MAX_STROKE_WIDTH: f64 = 100.0;

/// Errors raised by the drawing surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("pixel access failed: {0}")]
    Borrow(#[from] cairo::BorrowError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("the {0} tool does not draw")]
    ToolDoesNotDraw(Tool),

    #[error("invalid content size {0}x{1}")]
    InvalidSize(i32, i32),

    #[error("snapshot stride {actual} does not match the expected {expected}")]
    StrideMismatch { expected: i32, actual: u32 },

    #[error("content buffer pixels are unavailable")]
    PixelsUnavailable,
}

/// Active tool plus the pen style used for new strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolConfig {
    pub tool: Tool,
    pub color: Color,
    /// Stroke width in screen pixels (divided by the zoom scale when drawing)
    pub width: f64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tool: Tool::Pen,
            color: BLACK,
            width: 5.0,
        }
    }
}

impl ToolConfig {
    /// Line width in content units for a stroke started at `scale`.
    ///
    /// Dividing by the scale keeps the on-screen thickness constant at any zoom.
    pub fn effective_line_width(&self, scale: f64) -> f64 {
        self.width / scale
    }
}

/// Parameters captured when a stroke begins.
#[derive(Debug, Clone, Copy)]
struct OpenStroke {
    last: (f64, f64),
    line_width: f64,
    operator: Operator,
    color: Color,
}

/// Owns the content buffer: the raster surface holding all committed strokes.
///
/// The buffer has a fixed logical size that does not depend on the viewport
/// or the zoom level. It is the unit of undo/redo and persistence; viewports
/// are derived from it with [`DrawingSurface::render_to`].
pub struct DrawingSurface {
    content: ImageSurface,
    padding: f64,
    config: ToolConfig,
    stroke: Option<OpenStroke>,
}

impl std::fmt::Debug for DrawingSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingSurface")
            .field("width", &self.content.width())
            .field("height", &self.content.height())
            .field("padding", &self.padding)
            .field("config", &self.config)
            .field("stroke_open", &self.stroke.is_some())
            .finish()
    }
}

impl DrawingSurface {
    /// Creates a transparent content buffer of the given size.
    pub fn new(width: i32, height: i32, padding: f64) -> Result<Self, SurfaceError> {
        let max = MAX_CANVAS_DIMENSION as i32;
        if !(1..=max).contains(&width) || !(1..=max).contains(&height) {
            return Err(SurfaceError::InvalidSize(width, height));
        }
        let content = ImageSurface::create(Format::ARgb32, width, height)?;
        Ok(Self {
            content,
            padding,
            config: ToolConfig::default(),
            stroke: None,
        })
    }

    pub fn width(&self) -> i32 {
        self.content.width()
    }

    pub fn height(&self) -> i32 {
        self.content.height()
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn tool_config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn tool(&self) -> Tool {
        self.config.tool
    }

    /// Selects the active tool. Never touches the buffer.
    pub fn set_tool(&mut self, tool: Tool) {
        self.config.tool = tool;
    }

    /// Sets the pen color and width (clamped to the supported range).
    pub fn set_style(&mut self, color: Color, width: f64) {
        let clamped = width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH);
        if clamped != width {
            warn!("Stroke width {width:.1} out of range, clamping to {clamped:.1}");
        }
        self.config.color = color;
        self.config.width = clamped;
    }

    pub fn stroke_in_progress(&self) -> bool {
        self.stroke.is_some()
    }

    /// Opens a new stroke at a content-space point using the current tool and style.
    ///
    /// `scale` is the current zoom factor; the configured width is divided by
    /// it. Nothing is rasterized until the stroke is extended.
    pub fn begin_stroke(&mut self, x: f64, y: f64, scale: f64) -> Result<(), SurfaceError> {
        // DestOut only looks at source alpha, so the eraser always removes fully
        let (operator, color) = match self.config.tool {
            Tool::Pen => (Operator::Over, self.config.color),
            Tool::Eraser => (Operator::DestOut, BLACK),
            Tool::Pan => return Err(SurfaceError::ToolDoesNotDraw(Tool::Pan)),
        };

        if self.stroke.is_some() {
            debug!("Beginning a stroke while another was open; the old one is dropped");
        }

        self.stroke = Some(OpenStroke {
            last: (x, y),
            line_width: self.config.effective_line_width(scale),
            operator,
            color,
        });
        Ok(())
    }

    /// Appends a segment to the open stroke and rasterizes just that segment.
    ///
    /// Returns `false` when no stroke is open.
    pub fn extend_stroke(&mut self, x: f64, y: f64) -> Result<bool, SurfaceError> {
        let Some(stroke) = self.stroke.as_mut() else {
            debug!("extend_stroke without an open stroke; ignoring");
            return Ok(false);
        };

        let ctx = Context::new(&self.content)?;
        ctx.set_operator(stroke.operator);
        let color = stroke.color;
        ctx.set_source_rgba(color.r, color.g, color.b, color.a);
        ctx.set_line_width(stroke.line_width);
        ctx.set_line_cap(LineCap::Round);
        ctx.set_line_join(LineJoin::Round);
        ctx.move_to(stroke.last.0, stroke.last.1);
        ctx.line_to(x, y);
        ctx.stroke()?;

        stroke.last = (x, y);
        Ok(true)
    }

    /// Closes the open stroke. Returns whether one was open.
    pub fn end_stroke(&mut self) -> bool {
        self.stroke.take().is_some()
    }

    /// Wipes the content buffer to fully transparent.
    pub fn clear(&mut self) -> Result<(), SurfaceError> {
        self.stroke = None;
        let ctx = Context::new(&self.content)?;
        ctx.set_operator(Operator::Clear);
        ctx.paint()?;
        Ok(())
    }

    /// Composites the content buffer into `viewport` under `transform`.
    pub fn render_to(
        &self,
        viewport: &ImageSurface,
        transform: &ViewTransform,
    ) -> Result<(), SurfaceError> {
        let ctx = Context::new(viewport)?;
        render::render_viewport(&ctx, &self.content, transform, self.padding)?;
        Ok(())
    }

    /// Serializes the content buffer.
    pub fn export_snapshot(&self) -> Result<Snapshot, SurfaceError> {
        let width = self.content.width() as u32;
        let height = self.content.height() as u32;
        let stride = self.content.stride() as u32;

        let mut encoded = None;
        self.content
            .with_data(|data| encoded = Some(Snapshot::encode(width, height, stride, data)))?;

        match encoded {
            Some(result) => Ok(result?),
            None => Err(SurfaceError::PixelsUnavailable),
        }
    }

    /// Replaces the content buffer with the pixels of `snapshot`.
    ///
    /// The snapshot is fully decoded into a separate surface before the buffer
    /// is touched, so a failure leaves the previous content intact. A snapshot
    /// with different dimensions is drawn at the origin and clipped.
    pub fn import_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), SurfaceError> {
        let decoded = snapshot.decode()?;
        let expected = Format::ARgb32.stride_for_width(decoded.width)?;
        if expected as u32 != decoded.stride {
            return Err(SurfaceError::StrideMismatch {
                expected,
                actual: decoded.stride,
            });
        }

        if decoded.width as i32 != self.width() || decoded.height as i32 != self.height() {
            debug!(
                "Restoring a {}x{} snapshot into a {}x{} buffer",
                decoded.width,
                decoded.height,
                self.width(),
                self.height()
            );
        }

        let source = ImageSurface::create_for_data(
            decoded.data,
            Format::ARgb32,
            decoded.width as i32,
            decoded.height as i32,
            expected,
        )?;

        self.stroke = None;
        let ctx = Context::new(&self.content)?;
        ctx.set_operator(Operator::Source);
        ctx.set_source_surface(&source, 0.0, 0.0)?;
        ctx.paint()?;
        Ok(())
    }

    /// Reads one premultiplied ARGB pixel as a native-endian `0xAARRGGBB` word.
    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return None;
        }
        let offset = y as usize * self.content.stride() as usize + x as usize * 4;
        let mut value = None;
        self.content
            .with_data(|data| {
                value = data
                    .get(offset..offset + 4)
                    .map(|px| u32::from_ne_bytes([px[0], px[1], px[2], px[3]]));
            })
            .ok()?;
        value
    }

    /// Alpha channel of one pixel.
    pub fn alpha_at(&self, x: i32, y: i32) -> Option<u8> {
        self.pixel(x, y).map(|px| (px >> 24) as u8)
    }

    /// Cairo surface holding the content, for read-only compositing.
    pub fn content_surface(&self) -> &ImageSurface {
        &self.content
    }
}
