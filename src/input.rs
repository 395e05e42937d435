//! Terminal event mapping and the shared pointer cell.

use std::sync::{Arc, Mutex};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};

/// What an input event asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Override key pressed; hold gesture at fist.
    OverrideDown,
    /// Override key released; camera label takes back over.
    OverrideUp,
    /// Override key pressed on a terminal without release events; flip the
    /// override instead of holding it.
    OverrideToggle,
    /// Retry camera acquisition.
    RetryCamera,
    /// Pointer moved to a new cell (column, row).
    PointerMoved(u16, u16),
    Quit,
    /// Event carries no action.
    None,
}

/// Map a terminal event to an action.
///
/// `release_events` says whether the terminal reports key releases (kitty
/// keyboard protocol). When it does, the override key is hold-to-fist;
/// when it doesn't, every release would be silently dropped and a held
/// override could never clear, so the key becomes a press-to-toggle.
pub fn map_event(event: &Event, release_events: bool) -> InputAction {
    match event {
        Event::Key(key) => map_key_event(key, release_events),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                InputAction::PointerMoved(mouse.column, mouse.row)
            }
            _ => InputAction::None,
        },
        _ => InputAction::None,
    }
}

fn map_key_event(key: &KeyEvent, release_events: bool) -> InputAction {
    // The override key is the only one that distinguishes press from
    // release; everything else acts on press.
    if key.code == KeyCode::Char(' ') {
        return match key.kind {
            KeyEventKind::Press if release_events => InputAction::OverrideDown,
            KeyEventKind::Press => InputAction::OverrideToggle,
            KeyEventKind::Release => InputAction::OverrideUp,
            KeyEventKind::Repeat => InputAction::None,
        };
    }
    if key.kind != KeyEventKind::Press {
        return InputAction::None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => InputAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => InputAction::Quit,
        KeyCode::Char('r') => InputAction::RetryCamera,
        _ => InputAction::None,
    }
}

/// Last-known pointer position in pixel coordinates, shared between the
/// event loop and anything that reads it per frame.
#[derive(Clone)]
pub struct PointerCell {
    pos: Arc<Mutex<(f32, f32)>>,
}

impl PointerCell {
    /// Start at the center of the given surface.
    pub fn centered(width: f32, height: f32) -> Self {
        Self {
            pos: Arc::new(Mutex::new((width / 2.0, height / 2.0))),
        }
    }

    pub fn set(&self, x: f32, y: f32) {
        if let Ok(mut guard) = self.pos.lock() {
            *guard = (x, y);
        }
    }

    pub fn get(&self) -> (f32, f32) {
        match self.pos.lock() {
            Ok(guard) => *guard,
            Err(_) => (0.0, 0.0),
        }
    }
}
