// ABOUTME: Chat widget — renders conversation messages into styled ratatui Lines.
// ABOUTME: User and bot messages get distinct prefixes; multi-line text keeps its breaks.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::session::{Message, Sender};

/// Render a slice of messages into styled Lines for display.
pub fn render_chat_lines(messages: &[Message]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (idx, msg) in messages.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }

        let prefix = match msg.sender {
            Sender::User => Span::styled(
                "❯ ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Sender::Bot => Span::styled(
                "⏺ ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        };

        // First line gets the prefix, continuation lines are indented under it.
        for (i, text) in msg.text.split('\n').enumerate() {
            if i == 0 {
                lines.push(Line::from(vec![prefix.clone(), Span::raw(text.to_string())]));
            } else {
                lines.push(Line::from(Span::raw(format!("  {text}"))));
            }
        }
    }

    lines
}

/// Line shown in place of the conversation while the widget is closed.
pub fn launcher_lines(message_count: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled("💬 ", Style::default().fg(Color::Cyan)),
        Span::styled(
            "Course assistant",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ])];
    lines.push(Line::from(Span::styled(
        "Press Ctrl+O to open the chat",
        Style::default().fg(Color::DarkGray),
    )));
    if message_count > 1 {
        lines.push(Line::from(Span::styled(
            format!("{message_count} messages in this session"),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}
