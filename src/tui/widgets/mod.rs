// ABOUTME: TUI widget sub-modules for chat, status bar, and the selection prompt.
// ABOUTME: Each widget is a pure rendering function over plain data.

pub mod chat;
pub mod selection;
pub mod status;
