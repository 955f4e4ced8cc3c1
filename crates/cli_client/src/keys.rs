//! Key event mapping for raw mode

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Submit,
    RecallPrevious,
    RecallNext,
    AcceptSuggestion,
    Insert(char),
    Backspace,
    Exit,
}

pub fn map_key(key: KeyEvent) -> Option<KeyAction> {
    // Windows reports releases too
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => Some(KeyAction::Exit),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(KeyAction::Insert(c)),
        KeyCode::Enter => Some(KeyAction::Submit),
        KeyCode::Up => Some(KeyAction::RecallPrevious),
        KeyCode::Down => Some(KeyAction::RecallNext),
        KeyCode::Tab => Some(KeyAction::AcceptSuggestion),
        KeyCode::Backspace => Some(KeyAction::Backspace),
        KeyCode::Esc => Some(KeyAction::Exit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(map_key(press(KeyCode::Enter)), Some(KeyAction::Submit));
        assert_eq!(map_key(press(KeyCode::Up)), Some(KeyAction::RecallPrevious));
        assert_eq!(map_key(press(KeyCode::Down)), Some(KeyAction::RecallNext));
        assert_eq!(map_key(press(KeyCode::Tab)), Some(KeyAction::AcceptSuggestion));
    }

    #[test]
    fn test_exit_keys() {
        assert_eq!(map_key(press(KeyCode::Esc)), Some(KeyAction::Exit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c), Some(KeyAction::Exit));
        let ctrl_d = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_d), Some(KeyAction::Exit));
    }

    #[test]
    fn test_text_keys() {
        assert_eq!(map_key(press(KeyCode::Char('n'))), Some(KeyAction::Insert('n')));
        let shifted = KeyEvent::new(KeyCode::Char('N'), KeyModifiers::SHIFT);
        assert_eq!(map_key(shifted), Some(KeyAction::Insert('N')));
        let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_a), None);
        assert_eq!(map_key(press(KeyCode::Backspace)), Some(KeyAction::Backspace));
    }
}
