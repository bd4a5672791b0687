use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::grid::Direction;

/// Everything a key press can mean to the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Arrow keys: cursor, grid size or leaderboard page, depending on screen.
    Navigate(Direction),
    /// Space/enter: start a game from the menu, flip the card under the cursor.
    Confirm,
    CycleMode,
    ToggleGridSelection,
    Leaderboard,
    /// Back to the menu.
    Back,
    NewGame,
    Quit,

    // Name entry.
    Type(char),
    Erase,
    Submit,
    Cancel,
}

/// Which key table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputContext {
    Normal,
    /// A text prompt has focus; letters are text, not shortcuts.
    TextEntry,
}

/// Map one terminal key event. Releases and unbound keys map to `None`.
pub fn map_key(key: KeyEvent, ctx: InputContext) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Command::Quit);
    }

    match ctx {
        InputContext::TextEntry => match key.code {
            KeyCode::Enter => Some(Command::Submit),
            KeyCode::Esc => Some(Command::Cancel),
            KeyCode::Backspace => Some(Command::Erase),
            KeyCode::Char(c) if !c.is_control() => Some(Command::Type(c)),
            _ => None,
        },
        InputContext::Normal => match key.code {
            KeyCode::Left => Some(Command::Navigate(Direction::Left)),
            KeyCode::Right => Some(Command::Navigate(Direction::Right)),
            KeyCode::Up => Some(Command::Navigate(Direction::Up)),
            KeyCode::Down => Some(Command::Navigate(Direction::Down)),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Confirm),
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('B') => Some(Command::Back),
            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                'g' => Some(Command::CycleMode),
                'm' => Some(Command::ToggleGridSelection),
                'l' => Some(Command::Leaderboard),
                'n' => Some(Command::NewGame),
                'q' => Some(Command::Quit),
                _ => None,
            },
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn arrows_navigate() {
        assert_eq!(
            map_key(press(KeyCode::Left), InputContext::Normal),
            Some(Command::Navigate(Direction::Left))
        );
        assert_eq!(
            map_key(press(KeyCode::Down), InputContext::Normal),
            Some(Command::Navigate(Direction::Down))
        );
    }

    #[test]
    fn shortcuts_ignore_case() {
        for (c, cmd) in [
            ('g', Command::CycleMode),
            ('M', Command::ToggleGridSelection),
            ('l', Command::Leaderboard),
            ('N', Command::NewGame),
            ('q', Command::Quit),
            ('B', Command::Back),
        ] {
            assert_eq!(map_key(press(KeyCode::Char(c)), InputContext::Normal), Some(cmd));
        }
        assert_eq!(map_key(press(KeyCode::Char(' ')), InputContext::Normal), Some(Command::Confirm));
        assert_eq!(map_key(press(KeyCode::Char('x')), InputContext::Normal), None);
    }

    #[test]
    fn text_entry_takes_letters_literally() {
        assert_eq!(
            map_key(press(KeyCode::Char('q')), InputContext::TextEntry),
            Some(Command::Type('q'))
        );
        assert_eq!(
            map_key(press(KeyCode::Char(' ')), InputContext::TextEntry),
            Some(Command::Type(' '))
        );
        assert_eq!(map_key(press(KeyCode::Enter), InputContext::TextEntry), Some(Command::Submit));
        assert_eq!(map_key(press(KeyCode::Esc), InputContext::TextEntry), Some(Command::Cancel));
        assert_eq!(
            map_key(press(KeyCode::Backspace), InputContext::TextEntry),
            Some(Command::Erase)
        );
    }

    #[test]
    fn ctrl_c_always_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key, InputContext::Normal), Some(Command::Quit));
        assert_eq!(map_key(key, InputContext::TextEntry), Some(Command::Quit));
    }

    #[test]
    fn releases_are_ignored() {
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(key, InputContext::Normal), None);
    }
}
