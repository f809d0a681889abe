use std::time::Duration;

use anyhow::Result;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use segmark_core::core::{
    command::{Command, Direction},
    player::InputSource,
};

/// Maps a key press to a player command. Releases and unbound keys map to
/// nothing.
#[inline]
pub fn map_key(key: &KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Esc | KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Char(' ') => Some(Command::TogglePause),
        KeyCode::Left => Some(Command::Seek(Direction::Backward)),
        KeyCode::Right => Some(Command::Seek(Direction::Forward)),
        KeyCode::Delete | KeyCode::Backspace | KeyCode::Char('x' | '0') => Some(Command::Remove),
        KeyCode::Char(digit @ '1'..='9') => digit
            .to_digit(10)
            .and_then(|value| u8::try_from(value).ok())
            .map(Command::Assign),
        _ => None,
    }
}

/// Keyboard input from the terminal, polled once per frame interval.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl InputSource for TerminalInput {
    #[inline]
    fn next_command(&mut self, timeout: Duration) -> Result<Option<Command>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) => Ok(map_key(&key)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn bindings() {
        assert_eq!(map_key(&press(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(map_key(&press(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(
            map_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
        assert_eq!(map_key(&press(KeyCode::Char(' '))), Some(Command::TogglePause));
        assert_eq!(
            map_key(&press(KeyCode::Left)),
            Some(Command::Seek(Direction::Backward))
        );
        assert_eq!(
            map_key(&press(KeyCode::Right)),
            Some(Command::Seek(Direction::Forward))
        );
        assert_eq!(map_key(&press(KeyCode::Char('1'))), Some(Command::Assign(1)));
        assert_eq!(map_key(&press(KeyCode::Char('9'))), Some(Command::Assign(9)));
        for code in [
            KeyCode::Delete,
            KeyCode::Backspace,
            KeyCode::Char('x'),
            KeyCode::Char('0'),
        ] {
            assert_eq!(map_key(&press(code)), Some(Command::Remove));
        }
    }

    #[test]
    fn unbound_keys_and_releases_are_ignored() {
        assert_eq!(map_key(&press(KeyCode::Char('c'))), None);
        assert_eq!(map_key(&press(KeyCode::Up)), None);
        let release =
            KeyEvent::new_with_kind(KeyCode::Char('1'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(map_key(&release), None);
    }
}
