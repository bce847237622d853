use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;

use crate::board::drag::{DragOutcome, DragSession};
use crate::board::storage::{find_store_dir, load_board, save_board, FileStore, StringStore};
use crate::board::{fade, Board, Card, ColumnId};
use crate::input::action::Action;
use crate::input::keymap::map_key;

/// Reusable text editing buffer with cursor.
///
/// `cursor` is a **char index** (not byte index), always in `0..=char_count`.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    pub input: String,
    pub cursor: usize,
}

impl TextBuffer {
    pub fn new(input: String) -> Self {
        let cursor = input.chars().count();
        Self { input, cursor }
    }

    pub fn empty() -> Self {
        Self { input: String::new(), cursor: 0 }
    }

    /// Convert a char index to a byte index.
    fn byte_offset(&self, char_idx: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub fn insert(&mut self, c: char) {
        let byte_idx = self.byte_offset(self.cursor);
        self.input.insert(byte_idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let byte_idx = self.byte_offset(self.cursor - 1);
            self.input.remove(byte_idx);
            self.cursor -= 1;
        }
    }

    pub fn delete_word(&mut self) {
        let byte_pos = self.byte_offset(self.cursor);
        let before = &self.input[..byte_pos];
        let trimmed = before.trim_end();
        let start_byte = trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8()) // byte after the whitespace char
            .unwrap_or(0);
        let start_char = self.input[..start_byte].chars().count();
        self.input.drain(start_byte..byte_pos);
        self.cursor = start_char;
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.input.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.input.chars().count();
    }
}

/// Current interaction mode.
#[derive(Debug, Clone)]
pub enum Mode {
    Normal,
    /// A card is being carried; `over` is the index of the hovered column.
    Carry { over: usize },
    Input {
        prompt: &'static str,
        buf: TextBuffer,
        on_confirm: InputTarget,
    },
    Confirm {
        prompt: &'static str,
        on_confirm: ConfirmTarget,
    },
    Help,
}

#[derive(Debug, Clone)]
pub enum InputTarget {
    NewCardText,
    EditCardText(u32),
    SetWip(ColumnId),
}

#[derive(Debug, Clone)]
pub enum ConfirmTarget {
    DeleteCard(u32),
}

/// Notification severity for statusbar coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Global application state.
pub struct AppState {
    pub mode: Mode,
    pub focused_column: usize,
    pub selected_card: usize,
    /// The in-flight carry, if any. At most one; single-pointer model.
    pub drag: Option<DragSession>,
    pub notification: Option<String>,
    pub notification_level: NotificationLevel,
    pub notification_expires: Option<Instant>,
    pub should_quit: bool,
}

/// Presentation order of a column's cards: the terminal column shows the
/// most recently completed card first, all others keep collection order.
pub fn column_cards(board: &Board, column: ColumnId) -> Vec<&Card> {
    if column == ColumnId::TERMINAL {
        fade::sorted_done(board)
    } else {
        board.cards_in(column).collect()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            focused_column: 0,
            selected_card: 0,
            drag: None,
            notification: None,
            notification_level: NotificationLevel::Info,
            notification_expires: None,
            should_quit: false,
        }
    }

    /// The currently selected card, resolved through the column's
    /// presentation order.
    pub fn selected_card_ref<'a>(&self, board: &'a Board) -> Option<&'a Card> {
        let col = board.columns.get(self.focused_column)?;
        column_cards(board, col.id).get(self.selected_card).copied()
    }

    /// Show a transient notification.
    pub fn notify(&mut self, msg: impl Into<String>) {
        self.notification = Some(msg.into());
        self.notification_level = NotificationLevel::Info;
        self.notification_expires = Some(Instant::now() + Duration::from_secs(3));
    }

    /// Show a transient error notification (rendered in red).
    pub fn notify_error(&mut self, msg: impl Into<String>) {
        self.notification = Some(msg.into());
        self.notification_level = NotificationLevel::Error;
        self.notification_expires = Some(Instant::now() + Duration::from_secs(3));
    }

    /// Clear expired notifications.
    pub fn tick_notification(&mut self) {
        if let Some(expires) = self.notification_expires {
            if Instant::now() >= expires {
                self.notification = None;
                self.notification_level = NotificationLevel::Info;
                self.notification_expires = None;
            }
        }
    }

    /// Clamp the selected card index to the focused column's card count.
    pub fn clamp_selection(&mut self, board: &Board) {
        if let Some(col) = board.columns.get(self.focused_column) {
            let len = column_cards(board, col.id).len();
            if len == 0 {
                self.selected_card = 0;
            } else if self.selected_card >= len {
                self.selected_card = len - 1;
            }
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Main TUI application loop.
pub fn run(terminal: &mut DefaultTerminal, start_dir: &Path) -> color_eyre::Result<()> {
    let store_dir = find_store_dir(start_dir)?;
    let mut store = FileStore::open(store_dir);
    let mut board = load_board(&store)?;
    let mut state = AppState::new();
    state.clamp_selection(&board);

    loop {
        state.tick_notification();

        let now = Utc::now();
        terminal.draw(|f| crate::ui::render(f, &board, &state, now))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                let action = map_key(key, &state.mode);
                process_action(&mut board, &mut state, action, &mut store)?;

                if state.should_quit {
                    break;
                }
            }
        }
    }

    Ok(())
}

pub fn process_action<S: StringStore>(
    board: &mut Board,
    state: &mut AppState,
    action: Action,
    store: &mut S,
) -> color_eyre::Result<()> {
    match action {
        Action::None => {}

        // Navigation
        Action::FocusPrevColumn => {
            if state.focused_column > 0 {
                state.focused_column -= 1;
                state.clamp_selection(board);
            }
        }
        Action::FocusNextColumn => {
            if state.focused_column + 1 < board.columns.len() {
                state.focused_column += 1;
                state.clamp_selection(board);
            }
        }
        Action::SelectPrevCard => {
            if state.selected_card > 0 {
                state.selected_card -= 1;
            }
        }
        Action::SelectNextCard => {
            if let Some(col) = board.columns.get(state.focused_column) {
                if state.selected_card + 1 < column_cards(board, col.id).len() {
                    state.selected_card += 1;
                }
            }
        }

        // Carry
        Action::PickUpCard => handle_pick_up(board, state),
        Action::CarryPrevColumn | Action::CarryNextColumn => {
            handle_carry_move(board, state, action);
        }
        Action::DropCard => handle_drop(board, state, store)?,
        Action::CancelCarry => {
            if let Some(mut sess) = state.drag.take() {
                // Leaving clears any stale target, so finishing abandons.
                sess.leave();
                sess.finish(board, Utc::now());
            }
            state.mode = Mode::Normal;
            state.notify("Move cancelled");
        }

        // Card actions
        Action::NewCard => {
            if !board.can_accept(ColumnId::ENTRY) {
                state.notify_error(format!(
                    "{} is at its WIP limit",
                    ColumnId::ENTRY.title()
                ));
            } else {
                state.mode = Mode::Input {
                    prompt: "New card",
                    buf: TextBuffer::empty(),
                    on_confirm: InputTarget::NewCardText,
                };
            }
        }
        Action::EditCard => {
            if let Some(card) = state.selected_card_ref(board) {
                let (id, text) = (card.id, card.text.clone());
                state.mode = Mode::Input {
                    prompt: "Edit card",
                    buf: TextBuffer::new(text),
                    on_confirm: InputTarget::EditCardText(id),
                };
            }
        }
        Action::DeleteCard => {
            if let Some(card) = state.selected_card_ref(board) {
                state.mode = Mode::Confirm {
                    prompt: "Delete this card?",
                    on_confirm: ConfirmTarget::DeleteCard(card.id),
                };
            }
        }
        Action::SetWipLimit => {
            if let Some(col) = board.columns.get(state.focused_column) {
                state.mode = Mode::Input {
                    prompt: "WIP limit",
                    buf: TextBuffer::new(col.wip.to_string()),
                    on_confirm: InputTarget::SetWip(col.id),
                };
            }
        }

        // Board-level actions
        Action::ReloadBoard => {
            *board = load_board(store)?;
            state.clamp_selection(board);
            state.notify("Board reloaded");
        }
        Action::ShowHelp => state.mode = Mode::Help,
        Action::Quit => match state.mode {
            Mode::Normal => state.should_quit = true,
            _ => state.mode = Mode::Normal,
        },

        // Text input delegation
        Action::InputChar(_)
        | Action::InputBackspace
        | Action::InputLeft
        | Action::InputRight
        | Action::InputHome
        | Action::InputEnd
        | Action::InputDeleteWord
        | Action::InputConfirm
        | Action::InputCancel => {
            handle_input(board, state, action, store)?;
        }

        // Confirmation
        Action::Confirm | Action::Deny => {
            handle_confirm(board, state, action, store)?;
        }
    }

    Ok(())
}

/// Start carrying the selected card. Starting is always allowed; entering
/// the card's own column shows no affordance.
fn handle_pick_up(board: &Board, state: &mut AppState) {
    let Some(card) = state.selected_card_ref(board) else { return };
    let mut sess = DragSession::start(card.id);
    sess.enter(board, board.columns[state.focused_column].id);
    state.drag = Some(sess);
    state.mode = Mode::Carry { over: state.focused_column };
}

/// Retarget the carry to an adjacent column: leave the old surface (which
/// clears hint and target), then enter the new one for fresh feedback.
fn handle_carry_move(board: &Board, state: &mut AppState, action: Action) {
    let Mode::Carry { over } = state.mode else { return };
    let next = match action {
        Action::CarryPrevColumn if over > 0 => over - 1,
        Action::CarryNextColumn if over + 1 < board.columns.len() => over + 1,
        _ => return,
    };
    if let Some(sess) = state.drag.as_mut() {
        sess.leave();
        sess.enter(board, board.columns[next].id);
    }
    state.mode = Mode::Carry { over: next };
}

/// Attempt the drop on the hovered column. A refused drop (capacity) keeps
/// the carry live so it can be retargeted; a recorded drop commits at once.
fn handle_drop<S: StringStore>(
    board: &mut Board,
    state: &mut AppState,
    store: &mut S,
) -> color_eyre::Result<()> {
    let Mode::Carry { over } = state.mode else { return Ok(()) };
    let Some(mut sess) = state.drag.take() else { return Ok(()) };
    let column = board.columns[over].id;

    sess.drop_on(board, column);
    if sess.target().is_none() {
        state.notify_error(format!("{} is at its WIP limit", column.title()));
        state.drag = Some(sess);
        return Ok(());
    }

    let now = Utc::now();
    match sess.finish(board, now) {
        DragOutcome::Committed { card, to } => {
            save_board(store, board, now)?;
            state.mode = Mode::Normal;
            state.focused_column = board
                .columns
                .iter()
                .position(|c| c.id == to)
                .unwrap_or(0);
            state.selected_card = column_cards(board, to)
                .iter()
                .position(|c| c.id == card)
                .unwrap_or(0);
            state.notify(format!("Card moved to {}", to.title()));
        }
        DragOutcome::Abandoned => {
            state.mode = Mode::Normal;
        }
    }
    Ok(())
}

fn handle_input<S: StringStore>(
    board: &mut Board,
    state: &mut AppState,
    action: Action,
    store: &mut S,
) -> color_eyre::Result<()> {
    match action {
        Action::InputChar(c) => {
            if let Mode::Input { buf, .. } = &mut state.mode {
                buf.insert(c);
            }
        }
        Action::InputBackspace => {
            if let Mode::Input { buf, .. } = &mut state.mode {
                buf.backspace();
            }
        }
        Action::InputLeft => {
            if let Mode::Input { buf, .. } = &mut state.mode {
                buf.move_left();
            }
        }
        Action::InputRight => {
            if let Mode::Input { buf, .. } = &mut state.mode {
                buf.move_right();
            }
        }
        Action::InputHome => {
            if let Mode::Input { buf, .. } = &mut state.mode {
                buf.home();
            }
        }
        Action::InputEnd => {
            if let Mode::Input { buf, .. } = &mut state.mode {
                buf.end();
            }
        }
        Action::InputDeleteWord => {
            if let Mode::Input { buf, .. } = &mut state.mode {
                buf.delete_word();
            }
        }
        Action::InputCancel => state.mode = Mode::Normal,
        Action::InputConfirm => {
            let mode = std::mem::replace(&mut state.mode, Mode::Normal);
            if let Mode::Input { buf, on_confirm, .. } = mode {
                confirm_input(board, state, store, buf.input, on_confirm)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn confirm_input<S: StringStore>(
    board: &mut Board,
    state: &mut AppState,
    store: &mut S,
    text: String,
    target: InputTarget,
) -> color_eyre::Result<()> {
    match target {
        InputTarget::NewCardText => {
            // Blank text is silently rejected by the board; the modal
            // simply closes without appending anything.
            if let Some(id) = board.create_card(&text) {
                save_board(store, board, Utc::now())?;
                state.focused_column = board
                    .columns
                    .iter()
                    .position(|c| c.id == ColumnId::ENTRY)
                    .unwrap_or(0);
                state.selected_card = column_cards(board, ColumnId::ENTRY)
                    .iter()
                    .position(|c| c.id == id)
                    .unwrap_or(0);
                state.notify("Card created");
            }
        }
        InputTarget::EditCardText(id) => {
            board.edit_card(id, &text);
            save_board(store, board, Utc::now())?;
            state.notify("Card updated");
        }
        InputTarget::SetWip(column) => match text.trim().parse::<u32>() {
            Ok(limit) if limit >= 1 => {
                board.set_wip(column, limit);
                save_board(store, board, Utc::now())?;
                state.notify(format!("{} WIP limit set to {limit}", column.title()));
            }
            _ => state.notify_error("WIP limit must be a positive number"),
        },
    }
    Ok(())
}

fn handle_confirm<S: StringStore>(
    board: &mut Board,
    state: &mut AppState,
    action: Action,
    store: &mut S,
) -> color_eyre::Result<()> {
    let mode = std::mem::replace(&mut state.mode, Mode::Normal);
    if action != Action::Confirm {
        return Ok(());
    }
    if let Mode::Confirm { on_confirm, .. } = mode {
        match on_confirm {
            ConfirmTarget::DeleteCard(id) => {
                board.delete_card(id);
                save_board(store, board, Utc::now())?;
                state.clamp_selection(board);
                state.notify("Card deleted");
            }
        }
    }
    Ok(())
}
