use super::*;
use crate::config::{Config, KeybindingsConfig};
use crate::draw::{BLUE, Color, DrawingSurface, Snapshot};
use crate::export::{ExportError, ExportFormat};
use crate::history::History;
use crate::input::{Key, MouseButton, Tool};
use crate::session::{FileStore, MemoryStore, SessionOptions, SnapshotStore};
use crate::view::ViewTransform;

const PADDING: f64 = 25.0;

fn create_test_input_state_with(store: Box<dyn SnapshotStore>, restore: bool) -> InputState {
    let surface = DrawingSurface::new(100, 80, PADDING).unwrap();
    let view = ViewTransform::new(PADDING, 0.001);
    let action_map = KeybindingsConfig::default().build_action_map().unwrap();
    let mut state = InputState::new(surface, view, History::new(0), store, action_map);
    state.initialize(restore).unwrap();
    state
}

fn create_test_input_state() -> InputState {
    create_test_input_state_with(Box::new(MemoryStore::new()), false)
}

/// Draws a horizontal stroke along content row `y` from x=10 to x=90.
fn draw_row(state: &mut InputState, y: f64) {
    state.on_pointer_down(MouseButton::Left, 10.0 + PADDING, y + PADDING);
    state.on_pointer_move(50.0 + PADDING, y + PADDING);
    state.on_pointer_move(90.0 + PADDING, y + PADDING);
    state.on_pointer_up(MouseButton::Left);
}

fn press_with(state: &mut InputState, modifiers: &[Key], key: Key) -> bool {
    for m in modifiers {
        state.on_key_press(*m);
    }
    let handled = state.on_key_press(key);
    for m in modifiers {
        state.on_key_release(*m);
    }
    handled
}

#[test]
fn initialization_records_blank_canvas() {
    let mut state = create_test_input_state();
    assert_eq!(state.history().len(), 1);
    assert_eq!(state.state(), InteractionState::Idle);
    assert!(state.needs_redraw);
    assert!(!state.undo());
    assert!(!state.redo());
}

#[test]
fn stroke_is_drawn_and_recorded_on_release() {
    let mut state = create_test_input_state();

    state.on_pointer_down(MouseButton::Left, 35.0, 45.0);
    assert_eq!(state.state(), InteractionState::Drawing);
    state.on_pointer_move(85.0, 45.0);
    // Segments are rasterized immediately, before the stroke ends
    assert_eq!(state.surface().alpha_at(30, 20), Some(255));
    assert_eq!(state.history().len(), 1);

    state.on_pointer_up(MouseButton::Left);
    assert_eq!(state.state(), InteractionState::Idle);
    assert_eq!(state.history().len(), 2);
    assert_eq!(state.history().cursor(), Some(1));
}

#[test]
fn pointer_leave_ends_stroke() {
    let mut state = create_test_input_state();
    state.on_pointer_down(MouseButton::Left, 35.0, 45.0);
    state.on_pointer_move(85.0, 45.0);
    state.on_pointer_leave();

    assert_eq!(state.state(), InteractionState::Idle);
    assert_eq!(state.history().len(), 2);
}

#[test]
fn undo_and_redo_restore_content() {
    let mut state = create_test_input_state();
    draw_row(&mut state, 20.0);
    assert_eq!(state.surface().alpha_at(50, 20), Some(255));

    assert!(state.undo());
    assert_eq!(state.surface().alpha_at(50, 20), Some(0));
    assert!(!state.undo());

    assert!(state.redo());
    assert_eq!(state.surface().alpha_at(50, 20), Some(255));
    assert!(!state.redo());
}

#[test]
fn drawing_after_undo_discards_redo_branch() {
    let mut state = create_test_input_state();
    draw_row(&mut state, 10.0);
    draw_row(&mut state, 30.0);
    assert_eq!(state.history().len(), 3);

    state.undo();
    draw_row(&mut state, 50.0);

    assert_eq!(state.history().len(), 3);
    assert!(!state.history().can_redo());
    assert_eq!(state.surface().alpha_at(50, 10), Some(255));
    assert_eq!(state.surface().alpha_at(50, 30), Some(0));
    assert_eq!(state.surface().alpha_at(50, 50), Some(255));
}

#[test]
fn eraser_stroke_cuts_out_content() {
    let mut state = create_test_input_state();
    draw_row(&mut state, 20.0);

    state.set_tool(Tool::Eraser);
    state.set_style(BLUE, 20.0);
    state.on_pointer_down(MouseButton::Left, 50.0 + PADDING, 0.0 + PADDING);
    state.on_pointer_move(50.0 + PADDING, 60.0 + PADDING);
    state.on_pointer_up(MouseButton::Left);

    assert_eq!(state.surface().alpha_at(50, 20), Some(0));
    assert_eq!(state.surface().alpha_at(15, 20), Some(255));
    assert_eq!(state.history().len(), 3);
}

#[test]
fn eraser_ignores_translucent_pen_color() {
    let mut state = create_test_input_state();
    draw_row(&mut state, 20.0);

    state.set_tool(Tool::Eraser);
    state.set_style(Color::parse("#0000ff80").unwrap(), 20.0);
    state.on_pointer_down(MouseButton::Left, 50.0 + PADDING, 0.0 + PADDING);
    state.on_pointer_move(50.0 + PADDING, 60.0 + PADDING);
    state.on_pointer_up(MouseButton::Left);

    assert_eq!(state.surface().alpha_at(50, 20), Some(0));
    assert_eq!(state.surface().alpha_at(15, 20), Some(255));
}

#[test]
fn pan_tool_moves_view_without_touching_history() {
    let mut state = create_test_input_state();
    state.set_tool(Tool::Pan);

    state.on_pointer_down(MouseButton::Left, 10.0, 10.0);
    assert!(matches!(state.state(), InteractionState::Panning { .. }));
    state.on_pointer_move(30.0, 50.0);
    assert_eq!(state.view().offset(), (20.0, 40.0));
    state.on_pointer_move(0.0, 0.0);
    assert_eq!(state.view().offset(), (-10.0, -10.0));
    state.on_pointer_up(MouseButton::Left);

    assert_eq!(state.state(), InteractionState::Idle);
    assert_eq!(state.history().len(), 1);
}

#[test]
fn middle_button_pans_with_any_tool() {
    let mut state = create_test_input_state();
    assert_eq!(state.tool(), Tool::Pen);

    state.on_pointer_down(MouseButton::Middle, 0.0, 0.0);
    state.on_pointer_move(5.0, 7.0);
    state.on_pointer_up(MouseButton::Middle);

    assert_eq!(state.view().offset(), (5.0, 7.0));
    assert_eq!(state.history().len(), 1);
}

#[test]
fn right_button_is_ignored() {
    let mut state = create_test_input_state();
    state.on_pointer_down(MouseButton::Right, 40.0, 40.0);
    assert_eq!(state.state(), InteractionState::Idle);
}

#[test]
fn strokes_land_at_content_coordinates_after_pan_and_zoom() {
    let mut state = create_test_input_state();
    state.view.set_offset(100.0, 50.0);
    state.view.set_scale(2.0);

    // (sx - 100) / 2 - 25 = 40  =>  sx = 230 ; (sy - 50) / 2 - 25 = 30  =>  sy = 160
    state.on_pointer_down(MouseButton::Left, 230.0, 160.0);
    state.on_pointer_move(250.0, 160.0);
    state.on_pointer_up(MouseButton::Left);

    assert_eq!(state.surface().alpha_at(45, 30), Some(255));
    assert_eq!(state.surface().alpha_at(45, 10), Some(0));
}

#[test]
fn wheel_zooms_around_pointer_and_is_consumed() {
    let mut state = create_test_input_state();
    let before = state.view().to_content(120.0, 80.0);

    assert!(state.on_wheel(120.0, 80.0, -100.0));
    assert!((state.view().scale() - 1.1).abs() < 1e-9);

    let after = state.view().to_content(120.0, 80.0);
    assert!((before.0 - after.0).abs() < 1e-9);
    assert!((before.1 - after.1).abs() < 1e-9);
}

#[test]
fn wheel_is_ignored_mid_stroke() {
    let mut state = create_test_input_state();
    state.on_pointer_down(MouseButton::Left, 40.0, 40.0);

    assert!(state.on_wheel(40.0, 40.0, -500.0));
    assert_eq!(state.view().scale(), 1.0);

    state.on_pointer_up(MouseButton::Left);
    assert!(state.on_wheel(40.0, 40.0, -500.0));
    assert!((state.view().scale() - 1.5).abs() < 1e-9);
}

#[test]
fn wheel_zoom_is_clamped() {
    let mut state = create_test_input_state();
    state.on_wheel(0.0, 0.0, 1_000_000.0);
    assert_eq!(state.view().scale(), crate::view::MIN_SCALE);
    state.on_wheel(0.0, 0.0, -1_000_000.0);
    assert_eq!(state.view().scale(), crate::view::MAX_SCALE);
}

#[test]
fn undo_redo_shortcuts() {
    let mut state = create_test_input_state();
    draw_row(&mut state, 20.0);

    assert!(press_with(&mut state, &[Key::Ctrl], Key::Char('z')));
    assert_eq!(state.history().cursor(), Some(0));

    assert!(press_with(&mut state, &[Key::Ctrl, Key::Shift], Key::Char('Z')));
    assert_eq!(state.history().cursor(), Some(1));

    assert!(press_with(&mut state, &[Key::Meta], Key::Char('z')));
    assert_eq!(state.history().cursor(), Some(0));

    assert!(press_with(&mut state, &[Key::Ctrl], Key::Char('y')));
    assert_eq!(state.history().cursor(), Some(1));

    assert!(press_with(&mut state, &[Key::Meta, Key::Shift], Key::Char('z')));
    assert_eq!(state.history().cursor(), Some(1));
}

#[test]
fn unbound_keys_are_not_handled() {
    let mut state = create_test_input_state();
    assert!(!state.on_key_press(Key::Char('z')));
    assert!(!press_with(&mut state, &[Key::Alt], Key::Char('z')));
    assert!(!state.on_key_press(Key::Ctrl));
    state.on_key_release(Key::Ctrl);
    assert_eq!(state.modifiers, crate::input::Modifiers::new());
}

#[test]
fn tool_and_width_shortcuts() {
    let mut state = create_test_input_state();

    state.on_key_press(Key::Char('e'));
    assert_eq!(state.tool(), Tool::Eraser);
    state.on_key_press(Key::Char('m'));
    assert_eq!(state.tool(), Tool::Pan);
    state.on_key_press(Key::Char('p'));
    assert_eq!(state.tool(), Tool::Pen);

    let width = state.surface().tool_config().width;
    state.on_key_press(Key::Char('='));
    assert_eq!(state.surface().tool_config().width, width + 1.0);
    state.on_key_press(Key::Char('-'));
    state.on_key_press(Key::Char('-'));
    assert_eq!(state.surface().tool_config().width, width - 1.0);

    // Shifted symbols fire their binding with Shift held
    assert!(press_with(&mut state, &[Key::Shift], Key::Char('+')));
    assert_eq!(state.surface().tool_config().width, width);
    assert!(press_with(&mut state, &[Key::Shift], Key::Char('_')));
    assert_eq!(state.surface().tool_config().width, width - 1.0);

    state.view.set_offset(10.0, 10.0);
    state.on_key_press(Key::Char('0'));
    assert_eq!(state.view().offset(), (0.0, 0.0));
}

#[test]
fn width_adjustment_is_clamped() {
    let mut state = create_test_input_state();
    state.adjust_width(-1000.0);
    assert_eq!(state.surface().tool_config().width, 1.0);
    state.adjust_width(1000.0);
    assert_eq!(state.surface().tool_config().width, 100.0);
}

#[test]
fn clear_is_recorded_and_undoable() {
    let mut state = create_test_input_state();
    draw_row(&mut state, 20.0);

    assert!(state.on_key_press(Key::Delete));
    assert_eq!(state.surface().alpha_at(50, 20), Some(0));
    assert_eq!(state.history().len(), 3);

    assert!(state.undo());
    assert_eq!(state.surface().alpha_at(50, 20), Some(255));
}

#[test]
fn undo_mid_stroke_finishes_the_stroke_first() {
    let mut state = create_test_input_state();
    state.on_pointer_down(MouseButton::Left, 35.0, 45.0);
    state.on_pointer_move(85.0, 45.0);

    assert!(state.undo());
    assert_eq!(state.state(), InteractionState::Idle);
    assert_eq!(state.history().len(), 2);
    assert!(state.redo());
    assert_eq!(state.surface().alpha_at(30, 20), Some(255));
}

#[test]
fn failed_restore_keeps_cursor_on_displayed_snapshot() {
    let mut state = create_test_input_state();

    // Valid header, unreadable pixel payload
    let mut bytes = b"DPSN\x01".to_vec();
    for value in [100u32, 80, 400] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes.extend_from_slice(b"not gzip at all");
    let broken = Snapshot::from_bytes(bytes).unwrap();

    draw_row(&mut state, 20.0);
    state.history.record(broken);
    state.undo();
    assert_eq!(state.history().cursor(), Some(1));
    assert_eq!(state.surface().alpha_at(50, 20), Some(255));

    assert!(!state.redo());
    assert_eq!(state.history().cursor(), Some(1));
    assert_eq!(state.surface().alpha_at(50, 20), Some(255));
}

#[test]
fn save_then_restore_on_next_start() {
    let temp = tempfile::tempdir().unwrap();
    let options = SessionOptions::new(temp.path().to_path_buf(), "canvas");

    let mut first = create_test_input_state_with(Box::new(FileStore::new(options.clone())), true);
    draw_row(&mut first, 20.0);
    assert!(press_with(&mut first, &[Key::Ctrl], Key::Char('s')));
    // Strokes after the save are not persisted
    draw_row(&mut first, 60.0);

    let second = create_test_input_state_with(Box::new(FileStore::new(options)), true);
    assert_eq!(second.surface().alpha_at(50, 20), Some(255));
    assert_eq!(second.surface().alpha_at(50, 60), Some(0));
    assert_eq!(second.history().len(), 1);
}

#[test]
fn corrupt_saved_canvas_starts_blank() {
    let temp = tempfile::tempdir().unwrap();
    let options = SessionOptions::new(temp.path().to_path_buf(), "canvas");
    std::fs::write(options.slot_file_path(), b"garbage").unwrap();

    let state = create_test_input_state_with(Box::new(FileStore::new(options)), true);
    assert_eq!(state.history().len(), 1);
    assert_eq!(state.surface().alpha_at(50, 20), Some(0));
}

#[test]
fn restore_disabled_ignores_saved_canvas() {
    let mut store = MemoryStore::new();
    let mut surface = DrawingSurface::new(100, 80, PADDING).unwrap();
    surface.begin_stroke(0.0, 20.0, 1.0).unwrap();
    surface.extend_stroke(100.0, 20.0).unwrap();
    store.persist(&surface.export_snapshot().unwrap()).unwrap();

    let fresh = create_test_input_state_with(Box::new(store.clone()), false);
    assert_eq!(fresh.surface().alpha_at(50, 20), Some(0));

    let restored = create_test_input_state_with(Box::new(store), true);
    assert_eq!(restored.surface().alpha_at(50, 20), Some(255));
}

#[test]
fn cursor_style_follows_tool() {
    let mut state = create_test_input_state();
    state.set_style(BLUE, 12.0);
    assert_eq!(
        state.cursor_style(),
        CursorStyle::Brush {
            diameter: 12.0,
            outline: BLUE,
            fill: None
        }
    );

    state.set_tool(Tool::Eraser);
    assert!(matches!(
        state.cursor_style(),
        CursorStyle::Brush {
            fill: Some(crate::draw::WHITE),
            ..
        }
    ));

    state.set_style(BLUE, 1.0);
    assert_eq!(state.cursor_style(), CursorStyle::Hidden);

    state.set_tool(Tool::Pan);
    assert_eq!(state.cursor_style(), CursorStyle::Grab);
    state.on_pointer_down(MouseButton::Left, 0.0, 0.0);
    assert_eq!(state.cursor_style(), CursorStyle::Grabbing);
}

#[test]
fn render_clears_redraw_flag() {
    let mut state = create_test_input_state();
    draw_row(&mut state, 20.0);
    assert!(state.needs_redraw);

    let viewport = cairo::ImageSurface::create(cairo::Format::ARgb32, 200, 160).unwrap();
    state.render(&viewport).unwrap();
    assert!(!state.needs_redraw);
}

#[test]
fn export_through_controller() {
    let mut state = create_test_input_state();
    draw_row(&mut state, 20.0);

    let png = state.export(ExportFormat::Png, 90).unwrap();
    assert_eq!(&png[..4], b"\x89PNG");

    assert!(matches!(
        state.export(ExportFormat::Jpeg, 0),
        Err(ExportError::InvalidQuality(0))
    ));
}

#[test]
fn from_config_applies_defaults() {
    let mut config = Config::default();
    config.canvas.width = 64;
    config.canvas.height = 48;
    config.drawing.default_tool = Tool::Eraser;
    config.drawing.default_width = 9.0;
    config.session.restore_on_start = false;

    let state = InputState::from_config(&config, Box::new(MemoryStore::new())).unwrap();
    assert_eq!(state.surface().width(), 64);
    assert_eq!(state.surface().height(), 48);
    assert_eq!(state.tool(), Tool::Eraser);
    assert_eq!(state.surface().tool_config().width, 9.0);
    assert_eq!(state.history().len(), 1);
}

#[test]
fn from_config_rejects_duplicate_bindings() {
    let mut config = Config::default();
    config.keybindings.save = vec!["Ctrl+Z".to_string()];
    assert!(InputState::from_config(&config, Box::new(MemoryStore::new())).is_err());
}
