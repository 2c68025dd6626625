use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io::Result;
use std::time::Duration;

/// Actions that can be triggered by key events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Leave the application
    Quit,
    /// Inject the debug test message
    InjectDebug,
    /// Wipe the page now
    ClearPage,
    /// Stop writing the open line
    Interrupt,
}

/// Event handler for the TUI application
pub struct EventHandler;

impl EventHandler {
    /// Read one pending terminal event without blocking
    pub fn read() -> Result<Option<Event>> {
        if crossterm::event::poll(Duration::ZERO)? { Ok(Some(crossterm::event::read()?)) } else { Ok(None) }
    }

    /// Map a terminal event to an action
    pub fn handle_event(event: &Event) -> Option<KeyAction> {
        match event {
            Event::Key(key) => Self::handle_key_event(*key),
            _ => None,
        }
    }

    /// Map a key press to an action
    pub fn handle_key_event(event: KeyEvent) -> Option<KeyAction> {
        if event.kind != KeyEventKind::Press {
            return None;
        }

        match event.code {
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Some(KeyAction::Quit),
            KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
            KeyCode::Char('t') => Some(KeyAction::InjectDebug),
            KeyCode::Char('c') => Some(KeyAction::ClearPage),
            KeyCode::Char('i') => Some(KeyAction::Interrupt),
            _ => None,
        }
    }
}
