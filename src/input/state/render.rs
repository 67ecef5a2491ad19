use crate::draw::{BLACK, Color, SurfaceError, WHITE};
use crate::input::tool::Tool;
use cairo::ImageSurface;

use super::{InputState, InteractionState};

/// Widths below this hide the brush outline; the system pointer is used instead.
const MIN_BRUSH_CURSOR: f64 = 2.0;

/// What the pointer should look like over the viewport.
///
/// Front-ends draw `Brush` as a circle following the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorStyle {
    /// Circle of the stroke diameter; `fill` is `None` for a hollow outline
    Brush {
        diameter: f64,
        outline: Color,
        fill: Option<Color>,
    },
    /// Open hand (pan tool, idle)
    Grab,
    /// Closed hand (panning)
    Grabbing,
    /// Nothing drawn by the front-end
    Hidden,
}

impl InputState {
    /// Composites the content into `viewport` and clears `needs_redraw`.
    pub fn render(&mut self, viewport: &ImageSurface) -> Result<(), SurfaceError> {
        self.surface.render_to(viewport, &self.view)?;
        self.needs_redraw = false;
        Ok(())
    }

    /// Cursor matching the active tool and interaction.
    pub fn cursor_style(&self) -> CursorStyle {
        if matches!(self.state, InteractionState::Panning { .. }) {
            return CursorStyle::Grabbing;
        }

        let config = self.surface.tool_config();
        match config.tool {
            Tool::Pan => CursorStyle::Grab,
            _ if config.width < MIN_BRUSH_CURSOR => CursorStyle::Hidden,
            Tool::Pen => CursorStyle::Brush {
                diameter: config.width,
                outline: config.color,
                fill: None,
            },
            Tool::Eraser => CursorStyle::Brush {
                diameter: config.width,
                outline: BLACK,
                fill: Some(WHITE),
            },
        }
    }
}
