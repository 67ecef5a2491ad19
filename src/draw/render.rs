//! Cairo compositing of the content buffer into viewports and exports.

use super::color::Color;
use crate::view::ViewTransform;
use cairo::{Context, ImageSurface, Operator};

/// Color of the outline drawn around the content area.
pub const BORDER_COLOR: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.8,
};

/// Width of the content outline in content units.
pub const BORDER_WIDTH: f64 = 1.0;

/// Redraws a viewport from scratch.
///
/// Clears the target, applies the view transform (scale, then translate),
/// draws the content buffer at `(padding, padding)` and outlines the content
/// area so its extent stays visible at any zoom or pan.
///
/// # Arguments
/// * `ctx` - Cairo context targeting the viewport surface
/// * `content` - The content buffer
/// * `transform` - Current pan/zoom state
/// * `padding` - Margin between the viewport origin and the content buffer
pub fn render_viewport(
    ctx: &Context,
    content: &ImageSurface,
    transform: &ViewTransform,
    padding: f64,
) -> Result<(), cairo::Error> {
    ctx.save()?;
    ctx.identity_matrix();
    ctx.set_operator(Operator::Clear);
    ctx.paint()?;
    ctx.restore()?;

    ctx.save()?;
    ctx.set_matrix(transform.matrix());

    ctx.set_operator(Operator::Over);
    ctx.set_source_surface(content, padding, padding)?;
    ctx.paint()?;

    render_border(
        ctx,
        padding,
        padding,
        content.width() as f64,
        content.height() as f64,
    )?;

    ctx.restore()?;
    Ok(())
}

/// Strokes the thin outline marking the content area.
fn render_border(ctx: &Context, x: f64, y: f64, w: f64, h: f64) -> Result<(), cairo::Error> {
    ctx.set_source_rgba(BORDER_COLOR.r, BORDER_COLOR.g, BORDER_COLOR.b, BORDER_COLOR.a);
    ctx.set_line_width(BORDER_WIDTH);
    ctx.rectangle(x, y, w, h);
    ctx.stroke()
}

/// Paints `content` over an opaque background color.
///
/// Used for formats without an alpha channel.
pub fn render_flattened(
    ctx: &Context,
    content: &ImageSurface,
    background: Color,
) -> Result<(), cairo::Error> {
    ctx.set_operator(Operator::Source);
    ctx.set_source_rgba(background.r, background.g, background.b, 1.0);
    ctx.paint()?;

    ctx.set_operator(Operator::Over);
    ctx.set_source_surface(content, 0.0, 0.0)?;
    ctx.paint()
}
