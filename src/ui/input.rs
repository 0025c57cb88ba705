use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::ui::app_state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    Rescan,
    Cancel,
    Download,
    Export,
}

pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> InputAction {
    // Ctrl+C quits from anywhere
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return InputAction::Quit;
    }

    if state.notice.is_some() {
        return handle_notice_mode(key, state);
    }
    if state.show_help {
        return handle_help_mode(key, state);
    }

    match key.code {
        KeyCode::Char('q') => {
            state.should_quit = true;
            InputAction::Quit
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.move_down();
            InputAction::None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.move_up();
            InputAction::None
        }
        KeyCode::Char('?') => {
            state.toggle_help();
            InputAction::None
        }
        KeyCode::Char('r') => InputAction::Rescan,
        KeyCode::Char('c') => InputAction::Cancel,
        KeyCode::Char('d') => InputAction::Download,
        KeyCode::Char('x') => InputAction::Export,
        _ => InputAction::None,
    }
}

fn handle_notice_mode(key: KeyEvent, state: &mut AppState) -> InputAction {
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => {
            state.dismiss_notice();
            InputAction::None
        }
        _ => InputAction::None,
    }
}

fn handle_help_mode(key: KeyEvent, state: &mut AppState) -> InputAction {
    match key.code {
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
            state.toggle_help();
            InputAction::None
        }
        _ => InputAction::None,
    }
}

pub fn poll_event(timeout: Duration) -> anyhow::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
