// ABOUTME: TUI module — ratatui full-screen interface for coursebot.
// ABOUTME: Chat display, input handling, status bar, and the inline selection prompt.

pub mod input;
pub mod state;
pub mod ui;
pub mod widgets;

pub use state::*;
