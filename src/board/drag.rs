use chrono::{DateTime, Utc};

use super::{Board, ColumnId};

/// Visual affordance for a hovered drop surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropHint {
    /// The hovered column can accept the carried card.
    Ok,
    /// The hovered column is at its WIP limit.
    Invalid,
}

/// Outcome of a finished carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// A drop target was recorded; the card's column was reassigned.
    Committed { card: u32, to: ColumnId },
    /// No drop target was recorded; nothing changed.
    Abandoned,
}

/// A single in-flight card carry.
///
/// Lifecycle: `Idle → Dragging → {Committed | Abandoned} → Idle`. The session
/// exists only while a carry is in flight, and the single-pointer interaction
/// model guarantees at most one at a time.
///
/// Hover feedback ([`DragSession::enter`] / [`DragSession::leave`]) is
/// advisory and never mutates card state. Only [`DragSession::drop_on`]
/// records a pending target, and it re-checks capacity at that instant; a
/// stale hover affordance cannot commit an over-capacity move. The board is
/// mutated in exactly one place: [`DragSession::finish`].
#[derive(Debug)]
pub struct DragSession {
    subject: u32,
    target: Option<ColumnId>,
    hover: Option<(ColumnId, DropHint)>,
}

impl DragSession {
    /// Begin carrying a card. Starting is always allowed; capacity is only
    /// consulted once a drop is attempted.
    pub fn start(card: u32) -> Self {
        Self { subject: card, target: None, hover: None }
    }

    /// The card being carried.
    pub fn subject(&self) -> u32 {
        self.subject
    }

    /// Hover over a column surface.
    ///
    /// Entering the subject's own current column shows no indicator.
    /// Otherwise the returned hint reflects [`Board::can_accept`] at this
    /// instant; it is re-evaluated from scratch on every entry.
    pub fn enter(&mut self, board: &Board, column: ColumnId) -> Option<DropHint> {
        if board.card(self.subject).map(|c| c.column) == Some(column) {
            self.hover = None;
            return None;
        }
        let hint = if board.can_accept(column) {
            DropHint::Ok
        } else {
            DropHint::Invalid
        };
        self.hover = Some((column, hint));
        Some(hint)
    }

    /// Leave the hovered surface: clears the indicator and any recorded drop
    /// target. Re-entering re-evaluates from scratch.
    pub fn leave(&mut self) {
        self.hover = None;
        self.target = None;
    }

    /// Attempt to record `column` as the pending drop target.
    ///
    /// Lingering hover indicators are cleared unconditionally. The target is
    /// recorded only if the column can accept the card *at this instant*; on
    /// capacity failure nothing is recorded and the carry continues with no
    /// pending target.
    pub fn drop_on(&mut self, board: &Board, column: ColumnId) {
        self.hover = None;
        if board.can_accept(column) {
            self.target = Some(column);
        }
    }

    /// Current hover indicator, if any.
    pub fn hover(&self) -> Option<(ColumnId, DropHint)> {
        self.hover
    }

    /// Pending drop target, if one was recorded.
    pub fn target(&self) -> Option<ColumnId> {
        self.target
    }

    /// End the carry. The single commit point: with a recorded target the
    /// card moves (stamping its completion time if the target is terminal);
    /// without one the carry is abandoned and nothing changes. Consumes the
    /// session either way.
    pub fn finish(self, board: &mut Board, now: DateTime<Utc>) -> DragOutcome {
        match self.target {
            Some(to) => {
                board.move_to(self.subject, to, now);
                DragOutcome::Committed { card: self.subject, to }
            }
            None => DragOutcome::Abandoned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn board_with_card() -> (Board, u32) {
        let mut board = Board::new();
        let id = board.create_card("carry me").unwrap();
        (board, id)
    }

    #[test]
    fn enter_own_column_shows_no_indicator() {
        let (board, id) = board_with_card();
        let mut sess = DragSession::start(id);
        assert_eq!(sess.enter(&board, ColumnId::Ready), None);
        assert_eq!(sess.hover(), None);
    }

    #[test]
    fn enter_open_column_shows_ok() {
        let (board, id) = board_with_card();
        let mut sess = DragSession::start(id);
        assert_eq!(sess.enter(&board, ColumnId::InProgress), Some(DropHint::Ok));
        assert_eq!(sess.hover(), Some((ColumnId::InProgress, DropHint::Ok)));
    }

    #[test]
    fn enter_full_column_shows_invalid() {
        let (mut board, id) = board_with_card();
        board.set_wip(ColumnId::InProgress, 0);
        let mut sess = DragSession::start(id);
        assert_eq!(sess.enter(&board, ColumnId::InProgress), Some(DropHint::Invalid));
    }

    #[test]
    fn leave_clears_indicator_and_target() {
        let (board, id) = board_with_card();
        let mut sess = DragSession::start(id);
        sess.enter(&board, ColumnId::InProgress);
        sess.drop_on(&board, ColumnId::InProgress);
        assert!(sess.target().is_some());
        sess.leave();
        assert_eq!(sess.hover(), None);
        assert_eq!(sess.target(), None);
    }

    #[test]
    fn drop_records_target_when_capacity_holds() {
        let (board, id) = board_with_card();
        let mut sess = DragSession::start(id);
        sess.drop_on(&board, ColumnId::Done);
        assert_eq!(sess.target(), Some(ColumnId::Done));
        assert_eq!(sess.hover(), None);
    }

    #[test]
    fn drop_on_full_column_records_nothing() {
        let (mut board, id) = board_with_card();
        board.set_wip(ColumnId::InProgress, 0);
        let mut sess = DragSession::start(id);
        sess.enter(&board, ColumnId::InProgress);
        sess.drop_on(&board, ColumnId::InProgress);
        assert_eq!(sess.target(), None);
        // Indicator is cleared even on a refused drop.
        assert_eq!(sess.hover(), None);
    }

    #[test]
    fn finish_with_target_commits_move() {
        let (mut board, id) = board_with_card();
        let mut sess = DragSession::start(id);
        sess.drop_on(&board, ColumnId::Done);
        let outcome = sess.finish(&mut board, t0());
        assert_eq!(outcome, DragOutcome::Committed { card: id, to: ColumnId::Done });
        let card = board.card(id).unwrap();
        assert_eq!(card.column, ColumnId::Done);
        assert_eq!(card.done_at, Some(t0()));
    }

    #[test]
    fn finish_without_target_abandons() {
        let (mut board, id) = board_with_card();
        let mut sess = DragSession::start(id);
        sess.enter(&board, ColumnId::InProgress);
        let outcome = sess.finish(&mut board, t0());
        assert_eq!(outcome, DragOutcome::Abandoned);
        assert_eq!(board.card(id).unwrap().column, ColumnId::Ready);
    }

    #[test]
    fn hover_feedback_never_mutates_board() {
        let (mut board, id) = board_with_card();
        let mut sess = DragSession::start(id);
        sess.enter(&board, ColumnId::InProgress);
        sess.leave();
        sess.enter(&board, ColumnId::Done);
        sess.finish(&mut board, t0());
        let card = board.card(id).unwrap();
        assert_eq!(card.column, ColumnId::Ready);
        assert!(card.done_at.is_none());
    }

    #[test]
    fn stale_ok_hint_cannot_commit_after_capacity_fills() {
        // Advisory feedback said Ok, then the column filled up before the
        // drop; the authoritative re-check must refuse the target.
        let (mut board, id) = board_with_card();
        board.set_wip(ColumnId::InProgress, 1);
        let mut sess = DragSession::start(id);
        assert_eq!(sess.enter(&board, ColumnId::InProgress), Some(DropHint::Ok));

        let other = board.create_card("raced ahead").unwrap();
        board.move_to(other, ColumnId::InProgress, t0());

        sess.drop_on(&board, ColumnId::InProgress);
        assert_eq!(sess.target(), None);
        assert_eq!(sess.finish(&mut board, t0()), DragOutcome::Abandoned);
        assert_eq!(board.card(id).unwrap().column, ColumnId::Ready);
    }

    #[test]
    fn refused_drop_leaves_carry_retargetable() {
        let (mut board, id) = board_with_card();
        board.set_wip(ColumnId::InProgress, 0);
        let mut sess = DragSession::start(id);
        sess.drop_on(&board, ColumnId::InProgress);
        assert_eq!(sess.target(), None);

        // The carry is still live; a later drop on an open column works.
        sess.drop_on(&board, ColumnId::Done);
        assert_eq!(sess.target(), Some(ColumnId::Done));
        let outcome = sess.finish(&mut board, t0());
        assert_eq!(outcome, DragOutcome::Committed { card: id, to: ColumnId::Done });
    }

    #[test]
    fn drop_into_own_done_column_restamps_completion() {
        let (mut board, id) = board_with_card();
        board.move_to(id, ColumnId::Done, t0());
        let later = t0() + chrono::Duration::days(3);

        let mut sess = DragSession::start(id);
        sess.drop_on(&board, ColumnId::Done);
        sess.finish(&mut board, later);
        assert_eq!(board.card(id).unwrap().done_at, Some(later));
    }
}
