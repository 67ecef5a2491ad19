use crate::config::Action;
use crate::draw::{Color, SurfaceError};
use crate::export::{self, ExportError, ExportFormat};
use crate::input::{events::Key, tool::Tool};
use anyhow::Context as _;
use log::{debug, info, warn};

use super::InputState;

/// Which way a history step moved, so a failed restore can be reverted.
#[derive(Debug, Clone, Copy)]
enum Step {
    Undo,
    Redo,
}

impl InputState {
    /// Processes a key press event.
    ///
    /// Modifier keys update the modifier state; any other key is looked up in
    /// the keybinding map under the current modifiers. Returns `true` when the
    /// key triggered an action (the front-end should swallow it).
    pub fn on_key_press(&mut self, key: Key) -> bool {
        match key {
            Key::Shift => self.modifiers.shift = true,
            Key::Ctrl => self.modifiers.ctrl = true,
            Key::Alt => self.modifiers.alt = true,
            Key::Meta => self.modifiers.meta = true,
            _ => {}
        }

        let Some(key_str) = key.binding_name() else {
            return false;
        };

        match self.find_action(&key_str) {
            Some(action) => {
                self.handle_action(action);
                true
            }
            None => false,
        }
    }

    /// Processes a key release event.
    pub fn on_key_release(&mut self, key: Key) {
        match key {
            Key::Shift => self.modifiers.shift = false,
            Key::Ctrl => self.modifiers.ctrl = false,
            Key::Alt => self.modifiers.alt = false,
            Key::Meta => self.modifiers.meta = false,
            _ => {}
        }
    }

    /// Handle an action triggered by a keybinding.
    pub fn handle_action(&mut self, action: Action) {
        debug!("Handling {:?}", action);
        match action {
            Action::Undo => {
                self.undo();
            }
            Action::Redo => {
                self.redo();
            }
            Action::Save => {
                if let Err(err) = self.save() {
                    warn!("Saving the canvas failed: {:#}", err);
                }
            }
            Action::ClearCanvas => {
                if let Err(err) = self.clear() {
                    warn!("Clearing the canvas failed: {}", err);
                }
            }
            Action::ResetView => self.reset_view(),
            Action::SelectPen => self.set_tool(Tool::Pen),
            Action::SelectEraser => self.set_tool(Tool::Eraser),
            Action::SelectPan => self.set_tool(Tool::Pan),
            Action::IncreaseWidth => self.adjust_width(self.width_step),
            Action::DecreaseWidth => self.adjust_width(-self.width_step),
        }
    }

    /// Selects the tool used by the next stroke. An open stroke keeps its own tool.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.surface.tool() != tool {
            info!("Tool: {}", tool);
        }
        self.surface.set_tool(tool);
        self.needs_redraw = true;
    }

    /// Sets the color and width used by the next stroke.
    pub fn set_style(&mut self, color: Color, width: f64) {
        self.surface.set_style(color, width);
        self.needs_redraw = true;
    }

    /// Changes the stroke width by `delta`, clamped to the valid range.
    pub fn adjust_width(&mut self, delta: f64) {
        let config = *self.surface.tool_config();
        self.set_style(config.color, config.width + delta);
        debug!("Stroke width: {:.1}", self.surface.tool_config().width);
    }

    /// Returns the view to no pan and scale 1.0.
    pub fn reset_view(&mut self) {
        self.view.reset();
        self.needs_redraw = true;
    }

    /// Restores the previous snapshot. Returns whether the content changed.
    ///
    /// An open stroke is finished (and recorded) first.
    pub fn undo(&mut self) -> bool {
        self.finish_interaction();
        match self.history.undo() {
            Some(snapshot) => self.restore_step(&snapshot, Step::Undo),
            None => false,
        }
    }

    /// Re-applies the next snapshot. Returns whether the content changed.
    pub fn redo(&mut self) -> bool {
        self.finish_interaction();
        match self.history.redo() {
            Some(snapshot) => self.restore_step(&snapshot, Step::Redo),
            None => false,
        }
    }

    fn restore_step(&mut self, snapshot: &crate::draw::Snapshot, step: Step) -> bool {
        match self.surface.import_snapshot(snapshot) {
            Ok(()) => {
                self.needs_redraw = true;
                true
            }
            Err(err) => {
                warn!("{:?} failed, keeping the current canvas: {}", step, err);
                // Put the cursor back on the snapshot that is still displayed
                match step {
                    Step::Undo => self.history.redo(),
                    Step::Redo => self.history.undo(),
                };
                false
            }
        }
    }

    /// Wipes the canvas and records the blank state in the history.
    pub fn clear(&mut self) -> Result<(), SurfaceError> {
        self.finish_interaction();
        self.surface.clear()?;
        let snapshot = self.surface.export_snapshot()?;
        let id = self.history.record(snapshot);
        debug!("Recorded clear as history entry #{}", id);
        self.needs_redraw = true;
        Ok(())
    }

    /// Persists the current content to the durable slot.
    ///
    /// Independent of the undo history; only this call writes the slot.
    pub fn save(&mut self) -> anyhow::Result<()> {
        let snapshot = self
            .surface
            .export_snapshot()
            .context("failed to capture the canvas")?;
        self.store.persist(&snapshot)?;
        Ok(())
    }

    /// Encodes the current content as an image file.
    pub fn export(&self, format: ExportFormat, quality: u8) -> Result<Vec<u8>, ExportError> {
        let snapshot = self.surface.export_snapshot()?;
        export::encode_snapshot(&snapshot, format, quality)
    }
}
