// ABOUTME: TUI state types — chat/user events, the input buffer, and the widget being displayed.
// ABOUTME: Drives the TUI rendering and bridges the chat loop to the display.

use std::time::Instant;

use crate::chat::{Completion, PendingRequest};
use crate::widget::ChatWidget;

/// Events sent from the chat loop to the TUI via an mpsc channel.
#[derive(Debug)]
pub enum ChatEvent {
    /// A chat call finished, successfully or not. The gateway stays busy
    /// until this completion is applied or dropped.
    Reply(Completion),
}

/// Events sent from the TUI to the chat loop.
#[derive(Debug)]
pub enum UserEvent {
    /// Perform a request; the guard inside keeps the gateway busy until it completes.
    Send(PendingRequest),
    /// User requested to quit.
    Quit,
}

/// Full TUI application state.
pub struct TuiState {
    pub widget: ChatWidget,
    pub input: String,
    pub cursor_pos: usize,
    pub scroll_offset: u16,
    /// One-line notice shown in the header, e.g. after restoring a session.
    pub notice: Option<String>,
    pub server: String,
    pub session_start: Instant,
}

impl TuiState {
    /// Create TUI state around a widget talking to `server`.
    pub fn new(widget: ChatWidget, server: String) -> Self {
        Self {
            widget,
            input: String::new(),
            cursor_pos: 0,
            scroll_offset: 0,
            notice: None,
            server,
            session_start: Instant::now(),
        }
    }

    /// Whether a chat call is in flight.
    pub fn generating(&self) -> bool {
        self.widget.is_generating()
    }

    /// Apply an event from the chat loop and reset scroll to bottom.
    pub fn apply_chat_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Reply(completion) => self.widget.apply_completion(completion),
        }
        self.scroll_offset = 0;
    }

    /// Hand the input buffer to the widget. Clears the buffer only when the
    /// widget accepted it.
    pub fn submit_input(&mut self) -> Option<PendingRequest> {
        let pending = self.widget.submit_text(&self.input)?;
        self.input.clear();
        self.cursor_pos = 0;
        self.scroll_offset = 0;
        Some(pending)
    }

    /// Clamp the cursor position to the valid character range of the input buffer.
    pub fn clamp_cursor(&mut self) {
        self.cursor_pos = self.cursor_pos.min(self.input_char_len());
    }

    /// Return the current cursor byte index in the UTF-8 input buffer.
    pub fn cursor_byte_index(&self) -> usize {
        char_index_to_byte_index(&self.input, self.cursor_pos)
    }

    /// Return the total number of characters in the input buffer.
    pub fn input_char_len(&self) -> usize {
        self.input.chars().count()
    }

    /// Insert a character at the cursor and advance by one character.
    pub fn insert_char_at_cursor(&mut self, c: char) {
        self.clamp_cursor();
        let byte_index = self.cursor_byte_index();
        self.input.insert(byte_index, c);
        self.cursor_pos += 1;
    }

    /// Delete the character before the cursor (backspace behavior).
    pub fn backspace_char(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos == 0 {
            return;
        }

        let end = self.cursor_byte_index();
        let start = char_index_to_byte_index(&self.input, self.cursor_pos - 1);
        self.input.replace_range(start..end, "");
        self.cursor_pos -= 1;
    }

    /// Delete the character at the cursor (delete behavior).
    pub fn delete_char_at_cursor(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos >= self.input_char_len() {
            return;
        }

        let start = self.cursor_byte_index();
        let end = char_index_to_byte_index(&self.input, self.cursor_pos + 1);
        self.input.replace_range(start..end, "");
    }

    pub fn move_cursor_left(&mut self) {
        self.clamp_cursor();
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos < self.input_char_len() {
            self.cursor_pos += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_pos = self.input_char_len();
    }

    /// Lines of the input buffer; an empty buffer is one empty line.
    pub fn input_lines(&self) -> Vec<&str> {
        self.input.split('\n').collect()
    }

    pub fn input_line_count(&self) -> usize {
        self.input.split('\n').count()
    }

    /// Zero-based line the cursor sits on.
    pub fn cursor_line(&self) -> usize {
        self.input
            .chars()
            .take(self.cursor_pos)
            .filter(|c| *c == '\n')
            .count()
    }

    /// Zero-based character column of the cursor within its line.
    pub fn cursor_column(&self) -> usize {
        self.input
            .chars()
            .take(self.cursor_pos)
            .collect::<Vec<_>>()
            .iter()
            .rev()
            .take_while(|c| **c != '\n')
            .count()
    }

    /// Move the cursor one line up, keeping the column where possible.
    /// Returns `false` when already on the first line.
    pub fn move_cursor_up_in_input(&mut self) -> bool {
        self.clamp_cursor();
        let line = self.cursor_line();
        if line == 0 {
            return false;
        }
        let column = self.cursor_column();
        self.cursor_pos = self.line_start(line - 1) + column.min(self.line_len(line - 1));
        true
    }

    /// Move the cursor one line down, keeping the column where possible.
    /// Returns `false` when already on the last line.
    pub fn move_cursor_down_in_input(&mut self) -> bool {
        self.clamp_cursor();
        let line = self.cursor_line();
        if line + 1 >= self.input_line_count() {
            return false;
        }
        let column = self.cursor_column();
        self.cursor_pos = self.line_start(line + 1) + column.min(self.line_len(line + 1));
        true
    }

    fn line_start(&self, line: usize) -> usize {
        self.input
            .split('\n')
            .take(line)
            .map(|l| l.chars().count() + 1)
            .sum()
    }

    fn line_len(&self, line: usize) -> usize {
        self.input
            .split('\n')
            .nth(line)
            .map_or(0, |l| l.chars().count())
    }
}

fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    if char_index == 0 {
        return 0;
    }

    match s.char_indices().nth(char_index) {
        Some((idx, _)) => idx,
        None => s.len(),
    }
}
