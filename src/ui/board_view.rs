use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph};
use ratatui::Frame;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;
use crate::app::{column_cards, AppState, Mode};
use crate::board::drag::DropHint;
use crate::board::fade::opacity;
use crate::board::{Board, Card, Column, ColumnId};

/// Border color for a column surface, reflecting carry affordance first,
/// then focus.
pub(crate) fn column_border_color(hint: Option<DropHint>, is_focused: bool) -> Color {
    match hint {
        Some(DropHint::Ok) => Theme::DROP_OK,
        Some(DropHint::Invalid) => Theme::DROP_INVALID,
        None if is_focused => Theme::COLUMN_BORDER,
        None => Theme::DIM,
    }
}

/// Truncate `text` to at most `avail` display columns, appending an ellipsis
/// when anything was cut. Grapheme-aware so wide and combining characters
/// are never split.
pub(crate) fn truncated(text: &str, avail: usize) -> String {
    if text.width() <= avail {
        return text.to_string();
    }
    let budget = avail.saturating_sub(1); // room for '…'
    let mut out = String::new();
    let mut used = 0;
    for g in text.graphemes(true) {
        let w = g.width();
        if used + w > budget {
            break;
        }
        used += w;
        out.push_str(g);
    }
    out.push('…');
    out
}

pub fn render_board(f: &mut Frame, area: Rect, board: &Board, state: &AppState, now: DateTime<Utc>) {
    let constraints: Vec<Constraint> = board
        .columns
        .iter()
        .map(|_| Constraint::Ratio(1, board.columns.len() as u32))
        .collect();
    let col_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (col_idx, col) in board.columns.iter().enumerate() {
        render_column(f, col_areas[col_idx], board, col, col_idx, state, now);
    }
}

fn render_column(
    f: &mut Frame,
    area: Rect,
    board: &Board,
    col: &Column,
    col_idx: usize,
    state: &AppState,
    now: DateTime<Utc>,
) {
    let cards = column_cards(board, col.id);
    let is_focused = state.focused_column == col_idx;
    let is_hovered = matches!(state.mode, Mode::Carry { over } if over == col_idx);

    // Carry affordance for this surface, if it is the hovered one.
    let hint = state
        .drag
        .as_ref()
        .and_then(|sess| sess.hover())
        .filter(|&(hovered, _)| hovered == col.id)
        .map(|(_, hint)| hint);

    let wip_badge = Span::styled(
        format!(" [{}/{}]", cards.len(), col.wip),
        Style::default().fg(Theme::wip_color(cards.len(), col.wip)),
    );

    let focused_mod = if is_focused || is_hovered {
        Modifier::BOLD
    } else {
        Modifier::empty()
    };

    let header_line = Line::from(vec![
        Span::styled(
            format!(" {} ", col.id.title()),
            Style::default()
                .fg(Theme::COLUMN_HEADER)
                .add_modifier(Modifier::BOLD),
        ),
        wip_badge,
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(column_border_color(hint, is_focused))
                .add_modifier(focused_mod),
        )
        .border_type(BorderType::Rounded)
        .title(header_line)
        .padding(Padding::new(1, 1, 0, 0));

    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let card_height: u16 = 3; // 1 inner line + 2 border lines
    let max_visible = (inner.height / card_height) as usize;

    let selected_in_col = if is_focused {
        state.selected_card.min(cards.len().saturating_sub(1))
    } else {
        0
    };
    let scroll_offset = if cards.len() > max_visible && selected_in_col >= max_visible {
        selected_in_col - max_visible + 1
    } else {
        0
    };

    for (vis_idx, card) in cards.iter().enumerate().skip(scroll_offset) {
        if vis_idx - scroll_offset >= max_visible {
            break;
        }
        let y = inner.y + ((vis_idx - scroll_offset) as u16 * card_height);
        let card_area = Rect::new(inner.x, y, inner.width, card_height);

        let is_selected = is_focused && selected_in_col == vis_idx;
        let is_carried = state
            .drag
            .as_ref()
            .is_some_and(|sess| sess.subject() == card.id);
        render_card(f, card_area, card, is_selected, is_carried, now);
    }
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    card: &Card,
    is_selected: bool,
    is_carried: bool,
    now: DateTime<Utc>,
) {
    if area.width < 4 || area.height < 3 {
        return;
    }

    let border_color = if is_carried {
        Theme::CARRY
    } else if is_selected {
        Theme::CARD_BORDER
    } else {
        Theme::DIM
    };
    let selected_mod = if is_selected { Modifier::BOLD } else { Modifier::empty() };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color).add_modifier(selected_mod))
        .border_type(if is_selected { BorderType::Thick } else { BorderType::Rounded });

    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.height == 0 || inner.width < 2 {
        return;
    }

    let pct = opacity(now, card);
    let text_color = if card.column == ColumnId::TERMINAL {
        Theme::fade_color(pct)
    } else {
        Theme::FG
    };

    // Completed cards show their remaining opacity on the right.
    let badge = if card.column == ColumnId::TERMINAL && card.done_at.is_some() {
        format!("{pct}%")
    } else {
        String::new()
    };

    let avail_text = (inner.width as usize)
        .saturating_sub(badge.width() + if badge.is_empty() { 0 } else { 1 });
    let text = truncated(&card.text, avail_text);
    let padding = (inner.width as usize).saturating_sub(text.width() + badge.width());

    let line = Line::from(vec![
        Span::styled(
            text,
            Style::default().fg(text_color).add_modifier(selected_mod),
        ),
        Span::raw(" ".repeat(padding)),
        Span::styled(badge, Theme::dim_style()),
    ]);

    f.render_widget(
        Paragraph::new(line),
        Rect::new(inner.x, inner.y, inner.width, 1),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── truncated ──

    #[test]
    fn truncated_short_text_unchanged() {
        assert_eq!(truncated("hello", 10), "hello");
    }

    #[test]
    fn truncated_exact_fit_unchanged() {
        assert_eq!(truncated("hello", 5), "hello");
    }

    #[test]
    fn truncated_cuts_and_appends_ellipsis() {
        assert_eq!(truncated("hello world", 6), "hello…");
    }

    #[test]
    fn truncated_handles_wide_graphemes() {
        // "日" is 2 columns wide; budget of 3 fits one glyph + ellipsis.
        assert_eq!(truncated("日本語", 3), "日…");
    }

    #[test]
    fn truncated_zero_width_yields_ellipsis_only() {
        assert_eq!(truncated("text", 0), "…");
    }

    // ── column_border_color ──

    #[test]
    fn border_color_drop_ok_wins_over_focus() {
        assert_eq!(column_border_color(Some(DropHint::Ok), true), Theme::DROP_OK);
        assert_eq!(column_border_color(Some(DropHint::Ok), false), Theme::DROP_OK);
    }

    #[test]
    fn border_color_drop_invalid_is_red() {
        assert_eq!(
            column_border_color(Some(DropHint::Invalid), false),
            Theme::DROP_INVALID
        );
    }

    #[test]
    fn border_color_plain_follows_focus() {
        assert_eq!(column_border_color(None, true), Theme::COLUMN_BORDER);
        assert_eq!(column_border_color(None, false), Theme::DIM);
    }
}
