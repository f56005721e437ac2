use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::snake::Direction;

/// One decoded key press. `None` means nothing was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    None,
    Char(char),
    Enter,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Interrupt,
}

impl Key {
    pub fn from_event(ev: &Event) -> Key {
        match ev {
            Event::Key(key_ev) if key_ev.kind != KeyEventKind::Release => {
                Key::from_key_event(key_ev)
            }
            _ => Key::None,
        }
    }

    fn from_key_event(ev: &KeyEvent) -> Key {
        if is_ctrl_c(ev) {
            return Key::Interrupt;
        }

        match ev.code {
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Char(c) => Key::Char(c),
            _ => Key::None,
        }
    }

    /// Steering keys: arrows and WASD.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Key::Char('w') | Key::Up => Some(Direction::Up),
            Key::Char('a') | Key::Left => Some(Direction::Left),
            Key::Char('s') | Key::Down => Some(Direction::Down),
            Key::Char('d') | Key::Right => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn is_quit(self) -> bool {
        matches!(self, Key::Char('q') | Key::Char('Q') | Key::Interrupt)
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}
