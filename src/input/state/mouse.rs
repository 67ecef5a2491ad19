use crate::input::events::MouseButton;
use log::{debug, warn};

use super::{InputState, InteractionState};

impl InputState {
    /// Processes a pointer button press at screen coordinates.
    ///
    /// # Behavior
    /// - Left button with Pen/Eraser: opens a stroke at the content point
    /// - Left button with Pan, or middle button with any tool: starts panning
    /// - Right button, or any press while a drag is active: ignored
    pub fn on_pointer_down(&mut self, button: MouseButton, x: f64, y: f64) {
        if self.state != InteractionState::Idle {
            debug!("Ignoring {:?} press while {:?}", button, self.state);
            return;
        }

        let pans = match button {
            MouseButton::Left => !self.surface.tool().draws(),
            MouseButton::Middle => true,
            MouseButton::Right => return,
        };

        if pans {
            let (offset_x, offset_y) = self.view.offset();
            self.state = InteractionState::Panning {
                anchor_x: x - offset_x,
                anchor_y: y - offset_y,
            };
            self.needs_redraw = true;
            return;
        }

        let (cx, cy) = self.view.to_content(x, y);
        match self.surface.begin_stroke(cx, cy, self.view.scale()) {
            Ok(()) => {
                self.state = InteractionState::Drawing;
                self.needs_redraw = true;
            }
            Err(err) => warn!("Could not start stroke: {}", err),
        }
    }

    /// Processes pointer motion at screen coordinates.
    ///
    /// Extends the open stroke or moves the view; does nothing when idle.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        match self.state {
            InteractionState::Idle => {}
            InteractionState::Drawing => {
                let (cx, cy) = self.view.to_content(x, y);
                match self.surface.extend_stroke(cx, cy) {
                    Ok(_) => self.needs_redraw = true,
                    Err(err) => warn!("Failed to rasterize stroke segment: {}", err),
                }
            }
            InteractionState::Panning { anchor_x, anchor_y } => {
                self.view.set_offset(x - anchor_x, y - anchor_y);
                self.needs_redraw = true;
            }
        }
    }

    /// Processes a pointer button release. Ends the current stroke or pan.
    pub fn on_pointer_up(&mut self, button: MouseButton) {
        if button == MouseButton::Right {
            return;
        }
        self.finish_interaction();
    }

    /// Pointer left the viewport; treated like a release.
    pub fn on_pointer_leave(&mut self) {
        self.finish_interaction();
    }

    /// Processes a wheel event at screen coordinates.
    ///
    /// Zooms around the pointer unless a stroke is open. Always returns `true`:
    /// the event is consumed and the caller should suppress default scrolling.
    pub fn on_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        if self.state == InteractionState::Drawing {
            debug!("Ignoring wheel input during a stroke");
            return true;
        }

        if self.view.zoom_at(x, y, -delta_y) {
            self.needs_redraw = true;
        }
        true
    }
}
