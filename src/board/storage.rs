use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::fade::opacity;
use super::{Board, ColumnId};

/// Store key holding the serialized card collection.
pub const CARDS_KEY: &str = "cards";
/// Store key holding the serialized per-column WIP limits.
pub const WIP_KEY: &str = "wip-limits";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(".fado directory not found (walked up from {0})")]
    NotFound(PathBuf),
}

/// Boundary to a durable key-value string store.
///
/// `get` and `set` are the only operations the board uses; there are no
/// transactions and no partial updates. Writes are synchronous and
/// best-effort; a full store surfaces as an ordinary error.
pub trait StringStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Store backed by one file per key inside a `.fado/` directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StringStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.key_path(key), value)?;
        Ok(())
    }
}

/// In-memory store, for tests and ephemeral boards.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StringStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Find the .fado store directory by walking up from `start`.
pub fn find_store_dir(start: &Path) -> Result<PathBuf, StorageError> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(".fado");
        if candidate.is_dir() {
            return Ok(candidate);
        }
        if !dir.pop() {
            return Err(StorageError::NotFound(start.to_path_buf()));
        }
    }
}

/// Initialize a new .fado store under `root` with an empty board and the
/// default WIP limits.
pub fn init_store(root: &Path) -> Result<PathBuf, StorageError> {
    let dir = root.join(".fado");
    fs::create_dir_all(&dir)?;
    let mut store = FileStore::open(dir.clone());
    save_board(&mut store, &Board::new(), Utc::now())?;
    Ok(dir)
}

// ── Wire format ──
//
// Two keys, each a JSON array. Completion timestamps travel as RFC 3339
// strings with millisecond precision; column identifiers as the ColumnId
// wire names.

#[derive(Debug, Serialize, Deserialize)]
struct StoredCard {
    text: String,
    column: ColumnId,
    #[serde(rename = "doneAt", default, skip_serializing_if = "Option::is_none")]
    done_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredWip {
    column: ColumnId,
    wip: u32,
}

/// Load the board from the store.
///
/// Absent keys yield an empty board with default WIP limits. Individually
/// malformed card entries are skipped with a warning rather than failing
/// the whole load. Card ids are assigned fresh, in load order.
pub fn load_board<S: StringStore>(store: &S) -> Result<Board, StorageError> {
    let mut board = Board::new();

    if let Some(raw) = store.get(WIP_KEY)? {
        let limits: Vec<StoredWip> = serde_json::from_str(&raw)?;
        for limit in limits {
            board.set_wip(limit.column, limit.wip);
        }
    }

    if let Some(raw) = store.get(CARDS_KEY)? {
        let entries: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
        for entry in entries {
            match parse_card(entry) {
                Ok((text, column, done_at)) => {
                    board.restore_card(text, column, done_at);
                }
                Err(reason) => {
                    eprintln!("Warning: skipping invalid card entry: {reason}");
                }
            }
        }
    }

    Ok(board)
}

/// Save the board to the store: the full WIP configuration, and only the
/// cards that have not faded out entirely (`opacity > 0` at `now`). Expired
/// cards are dropped here and never come back.
pub fn save_board<S: StringStore>(
    store: &mut S,
    board: &Board,
    now: DateTime<Utc>,
) -> Result<(), StorageError> {
    let cards: Vec<StoredCard> = board
        .cards
        .iter()
        .filter(|card| opacity(now, card) > 0)
        .map(|card| StoredCard {
            text: card.text.clone(),
            column: card.column,
            done_at: card
                .done_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        })
        .collect();
    store.set(CARDS_KEY, &serde_json::to_string(&cards)?)?;

    let limits: Vec<StoredWip> = board
        .columns
        .iter()
        .map(|col| StoredWip { column: col.id, wip: col.wip })
        .collect();
    store.set(WIP_KEY, &serde_json::to_string(&limits)?)?;

    Ok(())
}

fn parse_card(
    entry: serde_json::Value,
) -> Result<(String, ColumnId, Option<DateTime<Utc>>), String> {
    let stored: StoredCard = serde_json::from_value(entry).map_err(|e| e.to_string())?;
    let done_at = match stored.done_at {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(&raw)
                .map_err(|e| format!("bad doneAt {raw:?}: {e}"))?
                .with_timezone(&Utc),
        ),
        None => None,
    };
    Ok((stored.text, stored.column, done_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fade::FADE_DAYS;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn load_empty_store_yields_default_board() {
        let store = MemoryStore::new();
        let board = load_board(&store).unwrap();
        assert!(board.cards.is_empty());
        assert_eq!(board.columns.len(), 3);
    }

    #[test]
    fn round_trip_preserves_text_column_and_timestamp() {
        let mut board = Board::new();
        let a = board.create_card("stay ready").unwrap();
        let b = board.create_card("get done").unwrap();
        board.move_to(b, ColumnId::Done, t0());
        board.set_wip(ColumnId::InProgress, 7);

        let mut store = MemoryStore::new();
        save_board(&mut store, &board, t0()).unwrap();
        let loaded = load_board(&store).unwrap();

        assert_eq!(loaded.cards.len(), 2);
        let la = &loaded.cards[0];
        assert_eq!(la.text, board.card(a).unwrap().text);
        assert_eq!(la.column, ColumnId::Ready);
        assert!(la.done_at.is_none());
        let lb = &loaded.cards[1];
        assert_eq!(lb.text, "get done");
        assert_eq!(lb.column, ColumnId::Done);
        assert_eq!(lb.done_at, Some(t0()));
        assert_eq!(loaded.column(ColumnId::InProgress).wip, 7);
    }

    #[test]
    fn round_trip_keeps_millisecond_precision() {
        let mut board = Board::new();
        let id = board.create_card("precise").unwrap();
        let stamp = t0() + Duration::milliseconds(123);
        board.move_to(id, ColumnId::Done, stamp);

        let mut store = MemoryStore::new();
        save_board(&mut store, &board, t0()).unwrap();
        let loaded = load_board(&store).unwrap();
        assert_eq!(loaded.cards[0].done_at, Some(stamp));
    }

    #[test]
    fn save_drops_fully_faded_cards() {
        let mut board = Board::new();
        let fresh = board.create_card("fresh").unwrap();
        let old = board.create_card("ancient").unwrap();
        board.move_to(fresh, ColumnId::Done, t0() - Duration::days(1));
        board.move_to(old, ColumnId::Done, t0() - Duration::days(FADE_DAYS + 1));

        let mut store = MemoryStore::new();
        save_board(&mut store, &board, t0()).unwrap();
        let loaded = load_board(&store).unwrap();

        assert_eq!(loaded.cards.len(), 1);
        assert_eq!(loaded.cards[0].text, "fresh");
    }

    #[test]
    fn save_keeps_stale_timestamp_outside_done() {
        // A card that left done keeps its old timestamp but never expires.
        let mut board = Board::new();
        let id = board.create_card("reopened").unwrap();
        board.move_to(id, ColumnId::Done, t0() - Duration::days(FADE_DAYS * 2));
        board.move_to(id, ColumnId::Ready, t0());

        let mut store = MemoryStore::new();
        save_board(&mut store, &board, t0()).unwrap();
        let loaded = load_board(&store).unwrap();
        assert_eq!(loaded.cards.len(), 1);
        assert_eq!(loaded.cards[0].column, ColumnId::Ready);
        assert!(loaded.cards[0].done_at.is_some());
    }

    #[test]
    fn load_skips_malformed_card_entries() {
        let mut store = MemoryStore::new();
        store
            .set(
                CARDS_KEY,
                r#"[{"text":"good","column":"ready"},
                    {"text":"bad column","column":"archive"},
                    {"text":"bad stamp","column":"done","doneAt":"not a date"},
                    {"text":"also good","column":"done","doneAt":"2025-06-15T12:00:00.000Z"}]"#,
            )
            .unwrap();
        let board = load_board(&store).unwrap();
        assert_eq!(board.cards.len(), 2);
        assert_eq!(board.cards[0].text, "good");
        assert_eq!(board.cards[1].text, "also good");
        assert_eq!(board.cards[1].done_at, Some(t0()));
    }

    #[test]
    fn load_rejects_non_array_cards_value() {
        let mut store = MemoryStore::new();
        store.set(CARDS_KEY, "{\"oops\":1}").unwrap();
        assert!(matches!(load_board(&store), Err(StorageError::Json(_))));
    }

    #[test]
    fn wip_limits_persist_for_all_columns() {
        let mut board = Board::new();
        board.set_wip(ColumnId::Ready, 3);
        board.set_wip(ColumnId::InProgress, 2);
        board.set_wip(ColumnId::Done, 99);

        let mut store = MemoryStore::new();
        save_board(&mut store, &board, t0()).unwrap();
        let loaded = load_board(&store).unwrap();
        assert_eq!(loaded.column(ColumnId::Ready).wip, 3);
        assert_eq!(loaded.column(ColumnId::InProgress).wip, 2);
        assert_eq!(loaded.column(ColumnId::Done).wip, 99);
    }

    #[test]
    fn stored_column_names_use_wire_form() {
        let mut board = Board::new();
        let id = board.create_card("wire check").unwrap();
        board.move_to(id, ColumnId::InProgress, t0());

        let mut store = MemoryStore::new();
        save_board(&mut store, &board, t0()).unwrap();
        let raw = store.get(CARDS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"inProgress\""), "got: {raw}");
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store_dir = init_store(dir.path()).unwrap();
        assert!(store_dir.is_dir());

        let mut store = FileStore::open(store_dir.clone());
        let mut board = load_board(&store).unwrap();
        board.create_card("on disk").unwrap();
        save_board(&mut store, &board, t0()).unwrap();

        let reopened = FileStore::open(store_dir);
        let loaded = load_board(&reopened).unwrap();
        assert_eq!(loaded.cards.len(), 1);
        assert_eq!(loaded.cards[0].text, "on disk");
    }

    #[test]
    fn find_store_dir_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let store_dir = init_store(dir.path()).unwrap();
        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_store_dir(&nested).unwrap(), store_dir);
    }

    #[test]
    fn find_store_dir_missing_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            find_store_dir(dir.path()),
            Err(StorageError::NotFound(_))
        ));
    }
}
