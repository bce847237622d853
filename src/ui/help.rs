use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use ratatui::Frame;

use super::centered_rect;
use super::theme::Theme;
use crate::input::keymap::BINDING_GROUPS;

/// Render the help overlay: every binding group as one section.
pub fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(area, 60, 80, 44, 18);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(Theme::FG))
        .title(Span::styled(
            " help ",
            Style::default().fg(Theme::FG).add_modifier(Modifier::BOLD),
        ))
        .padding(Padding::new(2, 2, 1, 1));

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let max_key_len = BINDING_GROUPS
        .iter()
        .flat_map(|g| g.bindings.iter())
        .map(|b| b.key.len())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line> = Vec::new();
    for group in BINDING_GROUPS {
        if !lines.is_empty() {
            lines.push(Line::raw(""));
        }
        lines.push(Line::from(Span::styled(
            group.name,
            Style::default().fg(Theme::FG).add_modifier(Modifier::BOLD),
        )));
        for binding in group.bindings {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:>width$}", binding.key, width = max_key_len),
                    Style::default().fg(Theme::HINT_KEY).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(binding.description, Style::default().fg(Theme::HINT_DESC)),
            ]));
        }
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "press q or esc to close",
        Theme::dim_style(),
    )));

    f.render_widget(Paragraph::new(lines), inner);
}
