pub mod drag;
pub mod fade;
pub mod storage;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier for one of the three fixed board columns.
///
/// Serializes as `"ready"` / `"inProgress"` / `"done"`, which is also the
/// wire form used by the persistence gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnId {
    Ready,
    InProgress,
    Done,
}

impl ColumnId {
    pub const ALL: [ColumnId; 3] = [Self::Ready, Self::InProgress, Self::Done];

    /// Column that newly created cards enter.
    pub const ENTRY: ColumnId = Self::Ready;

    /// Column whose entry stamps a completion timestamp.
    pub const TERMINAL: ColumnId = Self::Done;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::InProgress => "inProgress",
            Self::Done => "done",
        }
    }

    /// Human-readable column title for headers and messages.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// Position in the fixed column order (and in [`Board::columns`]).
    fn index(self) -> usize {
        match self {
            Self::Ready => 0,
            Self::InProgress => 1,
            Self::Done => 2,
        }
    }
}

impl std::str::FromStr for ColumnId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.chars().filter(|c| *c != '-' && *c != '_').collect();
        match normalized.to_lowercase().as_str() {
            "ready" => Ok(Self::Ready),
            "inprogress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(format!("unknown column '{s}': use ready, in-progress, done")),
        }
    }
}

impl std::fmt::Display for ColumnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single kanban column with its WIP capacity.
#[derive(Debug, Clone)]
pub struct Column {
    pub id: ColumnId,
    /// Maximum number of cards simultaneously permitted in this column.
    /// New placements are refused at the limit; over-capacity caused by
    /// lowering the limit afterwards is tolerated.
    pub wip: u32,
}

fn default_wip(id: ColumnId) -> u32 {
    match id {
        ColumnId::Ready => 10,
        ColumnId::InProgress => 3,
        ColumnId::Done => 100,
    }
}

/// A single kanban card.
#[derive(Debug, Clone)]
pub struct Card {
    /// Session-local handle, assigned at creation or load. Not persisted;
    /// presentation adapters key render state by it.
    pub id: u32,
    pub text: String,
    pub column: ColumnId,
    /// Set when the card enters the terminal column; re-entry overwrites it.
    /// Never cleared by leaving the terminal column.
    pub done_at: Option<DateTime<Utc>>,
}

/// The top-level board: the authoritative ordered card collection plus the
/// fixed column registry. All card state flows through this aggregate.
#[derive(Debug, Clone)]
pub struct Board {
    next_card_id: u32,
    /// The three fixed columns, in [`ColumnId::ALL`] order.
    pub columns: [Column; 3],
    pub cards: Vec<Card>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board with the three fixed columns at their default limits.
    pub fn new() -> Self {
        Self {
            next_card_id: 1,
            columns: ColumnId::ALL.map(|id| Column { id, wip: default_wip(id) }),
            cards: Vec::new(),
        }
    }

    /// Append a new card to the entry column.
    ///
    /// Blank text (after trimming) is silently rejected and the collection is
    /// left unchanged. Returns the new card's id otherwise. Callers gate this
    /// on [`Board::can_accept`] for the entry column.
    pub fn create_card(&mut self, text: &str) -> Option<u32> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let id = self.next_id();
        self.cards.push(Card {
            id,
            text: text.to_string(),
            column: ColumnId::ENTRY,
            done_at: None,
        });
        Some(id)
    }

    /// Replace a card's display text in place. Blank replacement text is
    /// silently rejected; column and completion timestamp are untouched.
    /// No-op if the card is not present.
    pub fn edit_card(&mut self, id: u32, new_text: &str) {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return;
        }
        if let Some(card) = self.cards.iter_mut().find(|c| c.id == id) {
            card.text = new_text.to_string();
        }
    }

    /// Remove a card by id. No-op if absent, so a double-delete is safe.
    pub fn delete_card(&mut self, id: u32) {
        self.cards.retain(|c| c.id != id);
    }

    /// Reassign a card's column. This is the only mutation path for `column`.
    ///
    /// Moving into the terminal column stamps `done_at` with `now`,
    /// overwriting any earlier completion time.
    pub fn move_to(&mut self, id: u32, column: ColumnId, now: DateTime<Utc>) {
        if let Some(card) = self.cards.iter_mut().find(|c| c.id == id) {
            card.column = column;
            if column == ColumnId::TERMINAL {
                card.done_at = Some(now);
            }
        }
    }

    /// Whether `column` has room for one more card: true iff its current
    /// count is strictly below its WIP limit. Advisory while hovering a
    /// carry, authoritative at drop time, and gates card creation.
    pub fn can_accept(&self, column: ColumnId) -> bool {
        self.count_in(column) < self.column(column).wip as usize
    }

    pub fn card(&self, id: u32) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn cards_in(&self, column: ColumnId) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(move |c| c.column == column)
    }

    pub fn count_in(&self, column: ColumnId) -> usize {
        self.cards_in(column).count()
    }

    pub fn column(&self, id: ColumnId) -> &Column {
        &self.columns[id.index()]
    }

    pub fn set_wip(&mut self, column: ColumnId, wip: u32) {
        self.columns[column.index()].wip = wip;
    }

    /// Append a card restored from the store, assigning it a fresh id.
    pub(crate) fn restore_card(
        &mut self,
        text: String,
        column: ColumnId,
        done_at: Option<DateTime<Utc>>,
    ) -> u32 {
        let id = self.next_id();
        self.cards.push(Card { id, text, column, done_at });
        id
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_card_id;
        self.next_card_id += 1;
        id
    }
}
