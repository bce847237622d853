use chrono::{DateTime, Duration, Utc};

use super::{Board, Card, ColumnId};

/// Days a completed card stays on the board before fading out entirely.
pub const FADE_DAYS: i64 = 14;

/// Display opacity for a card, as a percentage in `[0, 100]`.
///
/// Cards outside the terminal column, or without a completion timestamp,
/// are always fully opaque. Completed cards fade linearly over
/// [`FADE_DAYS`]; the raw value is clamped here so callers never see a
/// negative or >100 result (cards older than the window report 0, future
/// timestamps report 100).
pub fn opacity(reference: DateTime<Utc>, card: &Card) -> u8 {
    let done_at = match card.done_at {
        Some(t) if card.column == ColumnId::TERMINAL => t,
        _ => return 100,
    };
    let window_ms = Duration::days(FADE_DAYS).num_milliseconds() as f64;
    let elapsed_ms = (reference - done_at).num_milliseconds() as f64;
    let raw = 100.0 - (elapsed_ms / window_ms * 100.0).round();
    raw.clamp(0.0, 100.0) as u8
}

/// Whether a card has faded out entirely. Expired cards are excluded from
/// persistence and disappear on the next reload.
pub fn is_expired(reference: DateTime<Utc>, card: &Card) -> bool {
    opacity(reference, card) == 0
}

/// Presentation order for the terminal column: most recently completed
/// first. The relative order of cards without a completion timestamp is
/// unspecified; callers must not rely on it.
pub fn sorted_done(board: &Board) -> Vec<&Card> {
    let mut done: Vec<&Card> = board.cards_in(ColumnId::TERMINAL).collect();
    done.sort_by(|a, b| b.done_at.cmp(&a.done_at));
    done
}
