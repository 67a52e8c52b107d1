// ABOUTME: Main TUI rendering function — assembles header, chat, selection, input, and status bar.
// ABOUTME: Splits the terminal frame into vertical layout chunks and delegates to widgets.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::tui::state::TuiState;
use crate::tui::widgets::chat::{launcher_lines, render_chat_lines};
use crate::tui::widgets::selection::{highlighted_line, selection_lines};
use crate::tui::widgets::status::{StatusBarParams, status_line};

// Maximum height the input area can grow to (in terminal rows).
const MAX_INPUT_HEIGHT: u16 = 8;

// Rows the chat area keeps while the selection panel is shown.
const MIN_CHAT_HEIGHT: u16 = 3;

/// Render the full TUI screen layout to the given frame.
pub fn render(frame: &mut Frame, state: &mut TuiState) {
    let area = frame.area();
    let open = state.widget.is_open();
    let selecting = open && state.widget.wizard().is_active();

    // +2 accounts for top and bottom borders
    let input_height = (state.input_line_count() as u16 + 2).clamp(3, MAX_INPUT_HEIGHT);

    let selection = if selecting {
        state.widget.wizard().current().map(|view| {
            let lines = selection_lines(&view);
            let paragraph = Paragraph::new(lines.clone()).wrap(Wrap { trim: false });
            let content_height = paragraph.line_count(area.width) as u16;
            let max_height = area
                .height
                .saturating_sub(2 + input_height + MIN_CHAT_HEIGHT)
                .max(3);
            let height = content_height.clamp(3, max_height);

            // Keep the highlighted option on screen when the panel is clipped.
            let through_highlight = Paragraph::new(lines[..=highlighted_line(&view)].to_vec())
                .wrap(Wrap { trim: false })
                .line_count(area.width) as u16;
            let scroll = through_highlight.saturating_sub(height);
            (paragraph.scroll((scroll, 0)), height)
        })
    } else {
        None
    };

    let constraints = if !open {
        vec![
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Launcher
            Constraint::Length(1), // Status bar
        ]
    } else if let Some((_, selection_height)) = &selection {
        vec![
            Constraint::Length(1),                 // Header
            Constraint::Min(MIN_CHAT_HEIGHT),      // Chat area
            Constraint::Length(*selection_height), // Selection panel
            Constraint::Length(input_height),      // Input area
            Constraint::Length(1),                 // Status bar
        ]
    } else {
        vec![
            Constraint::Length(1),            // Header
            Constraint::Min(3),               // Chat area
            Constraint::Length(input_height), // Input area
            Constraint::Length(1),            // Status bar
        ]
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    frame.render_widget(Paragraph::new(header_line(state)), chunks[0]);

    let status_chunk = chunks[chunks.len() - 1];
    let status = status_line(&StatusBarParams {
        session: state.widget.conversation().session_id().short(),
        language: state.widget.language(),
        server: &state.server,
        session_start: state.session_start,
        generating: state.generating(),
    });
    frame.render_widget(Paragraph::new(status), status_chunk);

    if !open {
        let launcher = launcher_lines(state.widget.messages().len());
        frame.render_widget(Paragraph::new(launcher), chunks[1]);
        return;
    }

    render_chat(frame, state, chunks[1]);

    let input_chunk = match selection {
        Some((panel, _)) => {
            frame.render_widget(panel, chunks[2]);
            chunks[3]
        }
        None => chunks[2],
    };

    render_input(frame, state, input_chunk, selecting);
}

fn header_line(state: &TuiState) -> Line<'static> {
    let mut spans = vec![Span::styled(
        " coursebot",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(notice) = &state.notice {
        spans.push(Span::styled(
            format!("  {notice}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn render_chat(frame: &mut Frame, state: &mut TuiState, chat_chunk: ratatui::layout::Rect) {
    let chat_lines = render_chat_lines(state.widget.messages());
    let visible_height = chat_chunk.height;

    // ratatui's own line_count() matches its internal wrapping exactly, so the
    // bottom of the conversation is never hidden.
    let chat_paragraph = Paragraph::new(chat_lines).wrap(Wrap { trim: false });
    let total_lines = chat_paragraph.line_count(chat_chunk.width) as u16;
    let max_scroll = total_lines.saturating_sub(visible_height);

    // Cap scroll_offset so it can't go past the top of the content.
    if state.scroll_offset > max_scroll {
        state.scroll_offset = max_scroll;
    }

    // scroll_offset is lines scrolled up from the bottom (0 = at bottom)
    let scroll = max_scroll.saturating_sub(state.scroll_offset);
    frame.render_widget(chat_paragraph.scroll((scroll, 0)), chat_chunk);
}

fn render_input(
    frame: &mut Frame,
    state: &mut TuiState,
    input_chunk: ratatui::layout::Rect,
    selecting: bool,
) {
    let generating = state.generating();
    let disabled = generating || selecting;

    let border_style = if selecting {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let mut input_block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(border_style);

    if generating {
        input_block = input_block.title(Span::styled(
            " waiting for reply... ",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let input = if selecting {
        Paragraph::new(Span::styled(
            "(pick an option above)",
            Style::default().fg(Color::DarkGray),
        ))
    } else if generating {
        Paragraph::new(Span::styled(
            state.input.clone(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(state.input.clone())
    };
    frame.render_widget(input.block(input_block), input_chunk);

    if disabled || input_chunk.width == 0 || input_chunk.height <= 1 {
        return;
    }

    state.clamp_cursor();
    let cursor_line = state.cursor_line();
    let cursor_col = state.cursor_column();

    // Visual (display) width of the text before the cursor on its line.
    let lines = state.input_lines();
    let line_text = lines.get(cursor_line).copied().unwrap_or("");
    let prefix: String = line_text.chars().take(cursor_col).collect();
    let visual_col = UnicodeWidthStr::width(prefix.as_str());

    let max_visual_col = input_chunk.width.saturating_sub(1) as usize;
    let cursor_x = input_chunk
        .x
        .saturating_add(visual_col.min(max_visual_col) as u16);
    // +1 for the top border, then offset by the cursor's line index.
    let cursor_y = input_chunk.y.saturating_add(1 + cursor_line as u16);
    frame.set_cursor_position(Position::new(cursor_x, cursor_y));
}
