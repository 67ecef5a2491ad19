//! Interaction state machine and controller state.

use crate::config::{Action, Config, KeyBinding};
use crate::draw::{DrawingSurface, SurfaceError};
use crate::history::History;
use crate::input::{modifiers::Modifiers, tool::Tool};
use crate::session::SnapshotStore;
use crate::view::ViewTransform;
use anyhow::Context as _;
use log::{debug, info, warn};
use std::collections::HashMap;

/// Current interaction mode.
///
/// Transitions are driven by pointer events; at most one stroke or pan is
/// active at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    /// Waiting for input
    Idle,
    /// A pen or eraser stroke is open on the drawing surface
    Drawing,
    /// Dragging the view; the anchor is `pointer - offset` at press time
    Panning { anchor_x: f64, anchor_y: f64 },
}

/// Controller owning the drawing surface, view transform, undo history and
/// the durable snapshot slot.
///
/// Every mutation sets `needs_redraw`; the front-end calls [`InputState::render`]
/// once per frame while it is set.
pub struct InputState {
    pub(crate) surface: DrawingSurface,
    pub(crate) view: ViewTransform,
    pub(crate) history: History,
    pub(crate) store: Box<dyn SnapshotStore>,
    /// Current modifier key state
    pub modifiers: Modifiers,
    pub(crate) state: InteractionState,
    /// Whether the viewport needs to be recomposited
    pub needs_redraw: bool,
    /// Amount the width keybindings add or remove
    pub width_step: f64,
    /// Keybinding action map for efficient lookup
    action_map: HashMap<KeyBinding, Action>,
}

impl InputState {
    /// Creates a controller from its parts. Call [`InputState::initialize`]
    /// before feeding events so the history has its first entry.
    pub fn new(
        surface: DrawingSurface,
        view: ViewTransform,
        history: History,
        store: Box<dyn SnapshotStore>,
        action_map: HashMap<KeyBinding, Action>,
    ) -> Self {
        Self {
            surface,
            view,
            history,
            store,
            modifiers: Modifiers::new(),
            state: InteractionState::Idle,
            needs_redraw: true,
            width_step: 1.0,
            action_map,
        }
    }

    /// Builds and initializes a controller from configuration.
    pub fn from_config(config: &Config, store: Box<dyn SnapshotStore>) -> anyhow::Result<Self> {
        let mut surface = DrawingSurface::new(
            config.canvas.width,
            config.canvas.height,
            config.canvas.padding,
        )
        .context("failed to create the content buffer")?;
        surface.set_tool(config.drawing.default_tool);
        surface.set_style(
            config.drawing.default_color.to_color(),
            config.drawing.default_width,
        );

        let view = ViewTransform::new(config.canvas.padding, config.view.zoom_sensitivity);
        let history = History::new(config.history.max_entries);
        let action_map = config
            .keybindings
            .build_action_map()
            .map_err(anyhow::Error::msg)
            .context("invalid keybindings")?;

        let mut state = Self::new(surface, view, history, store, action_map);
        state.width_step = config.drawing.width_step;
        state
            .initialize(config.session.restore_on_start)
            .context("failed to initialize the canvas")?;
        Ok(state)
    }

    /// Seeds the history with the starting content.
    ///
    /// With `restore_saved`, a stored snapshot is loaded into the surface and
    /// becomes the first history entry. When nothing usable is stored the
    /// blank buffer is recorded instead, so the first stroke can be undone.
    pub fn initialize(&mut self, restore_saved: bool) -> Result<(), SurfaceError> {
        if restore_saved {
            match self.store.load() {
                Ok(Some(snapshot)) => match self.surface.import_snapshot(&snapshot) {
                    Ok(()) => info!(
                        "Restored saved canvas ({}x{})",
                        snapshot.width(),
                        snapshot.height()
                    ),
                    Err(err) => warn!("Saved canvas could not be restored: {}", err),
                },
                Ok(None) => debug!("No saved canvas to restore"),
                Err(err) => warn!("Failed to load saved canvas: {:#}", err),
            }
        }

        let initial = self.surface.export_snapshot()?;
        let id = self.history.record(initial);
        debug!("Initial history entry #{}", id);
        self.needs_redraw = true;
        Ok(())
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn tool(&self) -> Tool {
        self.surface.tool()
    }

    /// Look up the action bound to `key_str` under the current modifiers.
    pub(super) fn find_action(&self, key_str: &str) -> Option<Action> {
        self.action_map.iter().find_map(|(binding, action)| {
            binding
                .matches(
                    key_str,
                    self.modifiers.ctrl,
                    self.modifiers.shift,
                    self.modifiers.alt,
                    self.modifiers.meta,
                )
                .then_some(*action)
        })
    }

    /// Ends whatever drag is in progress.
    ///
    /// A finished stroke is serialized and recorded in the history.
    pub(crate) fn finish_interaction(&mut self) {
        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::Drawing => {
                self.surface.end_stroke();
                match self.surface.export_snapshot() {
                    Ok(snapshot) => {
                        let id = self.history.record(snapshot);
                        debug!("Recorded stroke as history entry #{}", id);
                    }
                    Err(err) => warn!("Failed to snapshot finished stroke: {}", err),
                }
                self.needs_redraw = true;
            }
            InteractionState::Panning { .. } => {
                self.needs_redraw = true;
            }
            InteractionState::Idle => {}
        }
    }
}
