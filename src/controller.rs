//! Keyboard model of an editor window.
//!
//! Everything that needs no dialog is applied straight to [`AppState`]; the
//! three dialog keys come back as a [`Request`] for the window to fulfil.

use eframe::egui;

use crate::canvas::Direction;
use crate::project::BufferId;
use crate::settings::Settings;
use crate::state::AppState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorKey {
    Up,
    Down,
    Left,
    Right,
    /// Y: take the color under the cursor.
    Sample,
    /// Space: paint the pixel under the cursor.
    Paint,
    /// C: color-picker dialog.
    PickColor,
    /// O: open-file dialog.
    Open,
    /// S: save-file dialog.
    Save,
    /// N: new blank canvas in a new window.
    New,
}

impl EditorKey {
    pub const ALL: [EditorKey; 10] = [
        EditorKey::Up,
        EditorKey::Down,
        EditorKey::Left,
        EditorKey::Right,
        EditorKey::Sample,
        EditorKey::Paint,
        EditorKey::PickColor,
        EditorKey::Open,
        EditorKey::Save,
        EditorKey::New,
    ];

    pub fn egui_key(self) -> egui::Key {
        match self {
            EditorKey::Up => egui::Key::ArrowUp,
            EditorKey::Down => egui::Key::ArrowDown,
            EditorKey::Left => egui::Key::ArrowLeft,
            EditorKey::Right => egui::Key::ArrowRight,
            EditorKey::Sample => egui::Key::Y,
            EditorKey::Paint => egui::Key::Space,
            EditorKey::PickColor => egui::Key::C,
            EditorKey::Open => egui::Key::O,
            EditorKey::Save => egui::Key::S,
            EditorKey::New => egui::Key::N,
        }
    }

    pub fn from_egui(key: egui::Key) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.egui_key() == key)
    }

    fn direction(self) -> Option<Direction> {
        match self {
            EditorKey::Up => Some(Direction::Up),
            EditorKey::Down => Some(Direction::Down),
            EditorKey::Left => Some(Direction::Left),
            EditorKey::Right => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Work a key hands back to the window because it needs a dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    PickColor,
    OpenFile,
    SaveFile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// State changed.
    Applied,
    /// A new window was opened for this buffer.
    Opened(BufferId),
    /// The key needs a dialog first.
    Request(Request),
    /// Guard rejected the key (cursor at the edge, buffer already closed).
    Ignored,
}

/// Apply `key` pressed in the window of buffer `id`.
pub fn handle_key(
    state: &mut AppState,
    settings: &Settings,
    id: BufferId,
    key: EditorKey,
) -> KeyOutcome {
    if state.get(id).is_none() {
        return KeyOutcome::Ignored;
    }
    if let Some(direction) = key.direction() {
        return applied(state.move_cursor(id, direction));
    }
    match key {
        EditorKey::Sample => applied(state.sample_color(id).is_some()),
        EditorKey::Paint => applied(state.paint(id)),
        EditorKey::PickColor => KeyOutcome::Request(Request::PickColor),
        EditorKey::Open => KeyOutcome::Request(Request::OpenFile),
        EditorKey::Save => KeyOutcome::Request(Request::SaveFile),
        EditorKey::New => KeyOutcome::Opened(state.open_blank(
            settings.new_canvas_width,
            settings.new_canvas_height,
            settings.new_canvas_background,
        )),
        EditorKey::Up | EditorKey::Down | EditorKey::Left | EditorKey::Right => {
            KeyOutcome::Ignored
        }
    }
}

fn applied(changed: bool) -> KeyOutcome {
    if changed {
        KeyOutcome::Applied
    } else {
        KeyOutcome::Ignored
    }
}
