// ABOUTME: Keyboard input handling for the TUI — translates key events into actions.
// ABOUTME: Handles normal typing, wizard option picking, and the waiting-for-reply mode.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::chat::PendingRequest;
use crate::tui::state::TuiState;

/// The result of processing a key event.
#[derive(Debug)]
pub enum InputResult {
    /// No action needed.
    None,
    /// A request is ready for the chat loop.
    Send(PendingRequest),
    /// User wants to quit.
    Quit,
}

/// Process a key event against the current TUI state and return the resulting action.
pub fn handle_key(state: &mut TuiState, key: KeyEvent) -> InputResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return InputResult::Quit,
        KeyCode::Esc => return InputResult::Quit,
        KeyCode::Char('o') if ctrl => {
            state.widget.toggle_open();
            state.scroll_offset = 0;
            return InputResult::None;
        }
        KeyCode::Char('l') if ctrl => {
            let language = state.widget.cycle_language();
            state.notice = Some(format!("Language: {}", language.label()));
            return InputResult::None;
        }
        _ => {}
    }

    // A closed widget only reacts to the global keys above.
    if !state.widget.is_open() {
        return InputResult::None;
    }

    // PageUp/PageDown always scroll, regardless of mode.
    if handle_scroll_key(state, key.code) {
        return InputResult::None;
    }

    if state.widget.wizard().is_active() {
        return handle_wizard_key(state, key);
    }

    // While waiting for a reply, only scrolling is allowed.
    if state.generating() {
        match key.code {
            KeyCode::Up => state.scroll_offset = state.scroll_offset.saturating_add(1),
            KeyCode::Down => state.scroll_offset = state.scroll_offset.saturating_sub(1),
            _ => {}
        }
        return InputResult::None;
    }

    // Context-aware Up/Down: move within multiline input first, then scroll.
    match key.code {
        KeyCode::Up => {
            if !state.move_cursor_up_in_input() {
                state.scroll_offset = state.scroll_offset.saturating_add(1);
            }
            return InputResult::None;
        }
        KeyCode::Down => {
            if !state.move_cursor_down_in_input() {
                state.scroll_offset = state.scroll_offset.saturating_sub(1);
            }
            return InputResult::None;
        }
        _ => {}
    }

    match key.code {
        // Shift+Enter inserts a newline into the input buffer.
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
            state.insert_char_at_cursor('\n');
            InputResult::None
        }
        KeyCode::Enter => match state.submit_input() {
            Some(pending) => InputResult::Send(pending),
            None => InputResult::None,
        },
        KeyCode::Char(c) if !ctrl => {
            state.insert_char_at_cursor(c);
            InputResult::None
        }
        KeyCode::Backspace => {
            state.backspace_char();
            InputResult::None
        }
        KeyCode::Delete => {
            state.delete_char_at_cursor();
            InputResult::None
        }
        KeyCode::Left => {
            state.move_cursor_left();
            InputResult::None
        }
        KeyCode::Right => {
            state.move_cursor_right();
            InputResult::None
        }
        KeyCode::Home => {
            state.move_cursor_home();
            InputResult::None
        }
        KeyCode::End => {
            state.move_cursor_end();
            InputResult::None
        }
        _ => InputResult::None,
    }
}

fn handle_scroll_key(state: &mut TuiState, key: KeyCode) -> bool {
    match key {
        KeyCode::PageUp => {
            state.scroll_offset = state.scroll_offset.saturating_add(10);
            true
        }
        KeyCode::PageDown => {
            state.scroll_offset = state.scroll_offset.saturating_sub(10);
            true
        }
        _ => false,
    }
}

/// Handle key events while the wizard is waiting for a pick.
fn handle_wizard_key(state: &mut TuiState, key: KeyEvent) -> InputResult {
    let pending = match key.code {
        KeyCode::Left => {
            state.widget.move_highlight(-1);
            None
        }
        KeyCode::Right => {
            state.widget.move_highlight(1);
            None
        }
        KeyCode::Up => {
            state.scroll_offset = state.scroll_offset.saturating_add(1);
            None
        }
        KeyCode::Down => {
            state.scroll_offset = state.scroll_offset.saturating_sub(1);
            None
        }
        KeyCode::Enter => state.widget.choose_highlighted(),
        KeyCode::Char(c @ '1'..='9') => {
            let index = (c as usize) - ('1' as usize);
            state.widget.choose_option(index)
        }
        _ => None,
    };

    match pending {
        Some(pending) => {
            state.scroll_offset = 0;
            InputResult::Send(pending)
        }
        None => InputResult::None,
    }
}
