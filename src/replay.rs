//! Scripted input replay.
//!
//! A replay script is a JSON-lines file: one [`InputEvent`] per line, tagged
//! by its `event` field. Blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! {"event":"set_style","color":"#ff0000","width":8}
//! {"event":"pointer_down","x":40,"y":40}
//! {"event":"pointer_move","x":200,"y":120}
//! {"event":"pointer_up"}
//! {"event":"key","key":"z","ctrl":true}
//! ```

use crate::draw::Color;
use crate::input::{InputState, Key, MouseButton, Tool};
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// One front-end event or command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: MouseButton,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        #[serde(default)]
        button: MouseButton,
    },
    PointerLeave,
    Wheel {
        x: f64,
        y: f64,
        delta_y: f64,
    },
    /// Key press with the modifiers held for just this key
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        alt: bool,
        #[serde(default)]
        meta: bool,
    },
    SetTool {
        tool: Tool,
    },
    SetStyle {
        color: String,
        width: f64,
    },
    Undo,
    Redo,
    Clear,
    Save,
    ResetView,
}

/// Errors raised while reading a replay script.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Counts reported after a replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    /// Events that were accepted but had no effect (e.g. undo at the oldest entry)
    pub ignored: usize,
}

/// Parses a JSON-lines replay script.
pub fn parse_script(text: &str) -> Result<Vec<InputEvent>, ReplayError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| ReplayError::Parse {
                line: index + 1,
                source,
            })
        })
        .collect()
}

/// Reads and parses a replay script from disk.
pub fn load_script(path: &Path) -> Result<Vec<InputEvent>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read replay script {}", path.display()))?;
    parse_script(&text).with_context(|| format!("Invalid replay script {}", path.display()))
}

/// Feeds one event to the controller. Returns whether it had an effect.
pub fn apply_event(state: &mut InputState, event: &InputEvent) -> Result<bool> {
    debug!("Replay: {:?}", event);
    let applied = match event {
        InputEvent::PointerDown { x, y, button } => {
            state.on_pointer_down(*button, *x, *y);
            true
        }
        InputEvent::PointerMove { x, y } => {
            state.on_pointer_move(*x, *y);
            true
        }
        InputEvent::PointerUp { button } => {
            state.on_pointer_up(*button);
            true
        }
        InputEvent::PointerLeave => {
            state.on_pointer_leave();
            true
        }
        InputEvent::Wheel { x, y, delta_y } => state.on_wheel(*x, *y, *delta_y),
        InputEvent::Key {
            key,
            ctrl,
            shift,
            alt,
            meta,
        } => {
            let held: Vec<Key> = [
                (*ctrl, Key::Ctrl),
                (*shift, Key::Shift),
                (*alt, Key::Alt),
                (*meta, Key::Meta),
            ]
            .into_iter()
            .filter_map(|(down, k)| down.then_some(k))
            .collect();

            for modifier in &held {
                state.on_key_press(*modifier);
            }
            let handled = state.on_key_press(Key::from_name(key));
            for modifier in &held {
                state.on_key_release(*modifier);
            }
            handled
        }
        InputEvent::SetTool { tool } => {
            state.set_tool(*tool);
            true
        }
        InputEvent::SetStyle { color, width } => {
            let color = Color::parse(color)?;
            state.set_style(color, *width);
            true
        }
        InputEvent::Undo => state.undo(),
        InputEvent::Redo => state.redo(),
        InputEvent::Clear => {
            state.clear()?;
            true
        }
        InputEvent::Save => {
            state.save()?;
            true
        }
        InputEvent::ResetView => {
            state.reset_view();
            true
        }
    };
    Ok(applied)
}

/// Replays `events` in order.
///
/// Stops at the first event that fails; events without effect are counted
/// but not treated as errors.
pub fn run_script(state: &mut InputState, events: &[InputEvent]) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    for (index, event) in events.iter().enumerate() {
        let applied = apply_event(state, event)
            .with_context(|| format!("replay event #{} failed", index + 1))?;
        summary.events += 1;
        if !applied {
            summary.ignored += 1;
        }
    }

    if state.state() != crate::input::InteractionState::Idle {
        warn!("Replay ended mid-drag; finishing it");
        state.on_pointer_leave();
    }
    Ok(summary)
}
