// ABOUTME: Status bar widget — renders session, language, server, uptime, and waiting indicator.
// ABOUTME: Displayed at the bottom of the TUI as a single-line summary.

use std::time::{Duration, Instant};

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::chat::Language;

/// Everything the status bar shows.
pub struct StatusBarParams<'a> {
    pub session: &'a str,
    pub language: Language,
    pub server: &'a str,
    pub session_start: Instant,
    pub generating: bool,
}

/// Render the status bar line.
pub fn status_line(params: &StatusBarParams<'_>) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
        Span::styled(
            format!(" session {} ", params.session),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled("| ", dim),
        Span::styled(
            format!("{} ", params.language.label()),
            Style::default().fg(Color::White),
        ),
        Span::styled("| ", dim),
        Span::styled(format!("{} ", params.server), Style::default().fg(Color::White)),
        Span::styled("| ", dim),
        Span::styled(
            format!("{} ", format_elapsed(params.session_start.elapsed())),
            dim,
        ),
    ];

    if params.generating {
        spans.push(Span::styled("| ", dim));
        spans.push(Span::styled(
            "waiting for reply... ",
            Style::default().fg(Color::Yellow),
        ));
    }

    Line::from(spans)
}

/// Format elapsed time as `MmSSs`, or `HhMMm` past the hour.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 3600 {
        format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}m{:02}s", secs / 60, secs % 60)
    }
}
