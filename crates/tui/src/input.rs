use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Input events that the application can handle
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Navigation
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Home,
    End,

    // Readings
    ResetBaselines,

    // Display controls
    ToggleUnit,
    ToggleTheme,

    // Application control
    ShowHelp,
    Quit,

    // System
    Resize,
    Tick,

    Unknown,
}

/// Converts crossterm events to application events
#[derive(Default)]
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    /// Poll for input events with a timeout; `Tick` when nothing arrived
    pub fn poll_event(&mut self, timeout: Duration) -> anyhow::Result<InputEvent> {
        if !event::poll(timeout)? {
            return Ok(InputEvent::Tick);
        }

        Ok(match event::read()? {
            Event::Key(key_event) if key_event.kind != KeyEventKind::Release => self.map_key(key_event),
            Event::Resize(_, _) => InputEvent::Resize,
            _ => InputEvent::Unknown,
        })
    }

    pub fn map_key(&self, key_event: KeyEvent) -> InputEvent {
        if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c') {
            return InputEvent::Quit;
        }

        match key_event.code {
            KeyCode::Up | KeyCode::Char('k') => InputEvent::MoveUp,
            KeyCode::Down | KeyCode::Char('j') => InputEvent::MoveDown,
            KeyCode::PageUp => InputEvent::PageUp,
            KeyCode::PageDown => InputEvent::PageDown,
            KeyCode::Home => InputEvent::Home,
            KeyCode::End => InputEvent::End,

            KeyCode::Char('r') => InputEvent::ResetBaselines,
            KeyCode::Char('u') => InputEvent::ToggleUnit,
            KeyCode::Char('t') => InputEvent::ToggleTheme,

            KeyCode::Char('?') => InputEvent::ShowHelp,
            KeyCode::Char('q') => InputEvent::Quit,

            _ => InputEvent::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_mapping() {
        let handler = InputHandler::new();
        assert_eq!(handler.map_key(key(KeyCode::Char('j'))), InputEvent::MoveDown);
        assert_eq!(handler.map_key(key(KeyCode::Up)), InputEvent::MoveUp);
        assert_eq!(handler.map_key(key(KeyCode::End)), InputEvent::End);
        assert_eq!(handler.map_key(key(KeyCode::Char('r'))), InputEvent::ResetBaselines);
        assert_eq!(handler.map_key(key(KeyCode::Char('u'))), InputEvent::ToggleUnit);
        assert_eq!(handler.map_key(key(KeyCode::Char('t'))), InputEvent::ToggleTheme);
        assert_eq!(handler.map_key(key(KeyCode::Char('x'))), InputEvent::Unknown);
    }

    #[test]
    fn test_quit_keys() {
        let handler = InputHandler::new();
        assert_eq!(handler.map_key(key(KeyCode::Char('q'))), InputEvent::Quit);
        assert_eq!(
            handler.map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            InputEvent::Quit
        );
    }
}
