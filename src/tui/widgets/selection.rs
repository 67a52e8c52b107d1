// ABOUTME: Selection prompt widget — inline TUI panel for the feature-selection wizard.
// ABOUTME: Shows the reply prompt, the key being asked, and its selectable options.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::wizard::StepView;

/// Render the wizard step: prompt lines, the key with progress, one option
/// per line, and a key hint. Long lines are left for the caller to wrap.
pub fn selection_lines(view: &StepView<'_>) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = view
        .prompt
        .lines()
        .map(|text| {
            Line::from(Span::styled(
                text.to_string(),
                Style::default().fg(Color::White),
            ))
        })
        .collect();

    lines.push(Line::from(vec![
        Span::styled(
            "CHOOSE ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(view.key.to_string(), Style::default().fg(Color::White)),
        Span::styled(
            format!("  ({}/{})", view.index + 1, view.total),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    for (i, option) in view.options.iter().enumerate() {
        // Only the first nine options have a digit shortcut.
        let label = if i < 9 {
            format!("[{}] {}", i + 1, option)
        } else {
            format!("    {option}")
        };
        if i == view.highlighted {
            lines.push(Line::from(vec![
                Span::styled("❯ ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    label,
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
        } else {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(label, Style::default().fg(Color::DarkGray)),
            ]));
        }
    }

    lines.push(Line::from(Span::styled(
        "←/→ move  Enter choose  1-9 pick",
        Style::default().fg(Color::DarkGray),
    )));

    lines
}

/// Index into `selection_lines` of the highlighted option.
pub fn highlighted_line(view: &StepView<'_>) -> usize {
    view.prompt.lines().count() + 1 + view.highlighted
}
