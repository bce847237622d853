mod app;
mod board;
mod input;
mod ui;

use std::env;
use std::path::Path;

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::bail;

use board::fade::{is_expired, opacity};
use board::storage::{
    find_store_dir, init_store, load_board, save_board, FileStore, StorageError,
};
use board::ColumnId;

#[derive(Parser)]
#[command(
    name = "fado",
    about = "A keyboard-first kanban board where finished cards fade away"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize a new .fado/ store in the current directory
    Init,
    /// Add a new card to the ready column
    Add {
        /// Card text
        text: String,
    },
    /// List all cards by column
    List,
    /// Move a card to a different column
    Move {
        /// Card id as shown by `fado list`
        card_id: u32,
        /// Target column (ready, in-progress, done)
        column: ColumnId,
    },
    /// Delete a card
    Rm {
        /// Card id as shown by `fado list`
        card_id: u32,
    },
    /// Set a column's WIP limit
    Wip {
        /// Column (ready, in-progress, done)
        column: ColumnId,
        /// Maximum number of cards (at least 1)
        limit: u32,
    },
    /// Drop fully faded done cards from the store immediately
    Purge,
}

fn main() {
    // Install color_eyre for unexpected panics/errors (developer bugs).
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let cwd = match env::current_dir() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: cannot determine current directory: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Command::Init) => cmd_init(&cwd),
        Some(Command::Add { text }) => cmd_add(&cwd, &text),
        Some(Command::List) => cmd_list(&cwd),
        Some(Command::Move { card_id, column }) => cmd_move(&cwd, card_id, column),
        Some(Command::Rm { card_id }) => cmd_rm(&cwd, card_id),
        Some(Command::Wip { column, limit }) => cmd_wip(&cwd, column, limit),
        Some(Command::Purge) => cmd_purge(&cwd),
        None => cmd_tui(&cwd),
    };

    if let Err(e) = result {
        print_user_error(&e);
        std::process::exit(1);
    }
}

/// Print a user-friendly error message, with actionable hints for known error types.
fn print_user_error(error: &color_eyre::Report) {
    if let Some(storage_err) = error.downcast_ref::<StorageError>() {
        match storage_err {
            StorageError::NotFound(_) => {
                eprintln!("error: no fado board found in this directory.");
                eprintln!("  Run `fado init` to create one.");
            }
            StorageError::Json(e) => {
                eprintln!("error: the board store is not valid JSON.");
                eprintln!("  {e}");
            }
            StorageError::Io(e) => {
                eprintln!("error: could not read or write the board store.");
                eprintln!("  {e}");
            }
        }
        return;
    }

    // For eyre::eyre!() / bail!() messages, print the full error chain.
    // These are already human-readable strings like "Card '3' not found".
    eprintln!("error: {e:#}", e = error);
}

fn open_store(cwd: &Path) -> Result<FileStore, StorageError> {
    Ok(FileStore::open(find_store_dir(cwd)?))
}

fn cmd_init(cwd: &Path) -> color_eyre::Result<()> {
    if cwd.join(".fado").exists() {
        bail!("Board already exists in this directory.");
    }
    let dir = init_store(cwd)?;
    println!("Initialized fado board in {}", dir.display());
    println!("Run `fado` to open the board, or `fado add \"Card text\"` to add cards.");
    Ok(())
}

fn cmd_add(cwd: &Path, text: &str) -> color_eyre::Result<()> {
    let mut store = open_store(cwd)?;
    let mut board = load_board(&store)?;

    if !board.can_accept(ColumnId::ENTRY) {
        bail!(
            "{} is at its WIP limit ({})",
            ColumnId::ENTRY.title(),
            board.column(ColumnId::ENTRY).wip
        );
    }
    let Some(id) = board.create_card(text) else {
        bail!("Card text is empty");
    };
    save_board(&mut store, &board, Utc::now())?;
    println!("Created {id}: {}", text.trim());
    Ok(())
}

fn cmd_list(cwd: &Path) -> color_eyre::Result<()> {
    let store = open_store(cwd)?;
    let board = load_board(&store)?;
    let now = Utc::now();

    for col in &board.columns {
        let cards = app::column_cards(&board, col.id);
        println!("{} ({}/{})", col.id.title(), cards.len(), col.wip);
        for card in cards {
            if col.id == ColumnId::TERMINAL && card.done_at.is_some() {
                println!("  {:>3}  {}  {}%", card.id, card.text, opacity(now, card));
            } else {
                println!("  {:>3}  {}", card.id, card.text);
            }
        }
    }
    Ok(())
}

fn cmd_move(cwd: &Path, card_id: u32, column: ColumnId) -> color_eyre::Result<()> {
    let mut store = open_store(cwd)?;
    let mut board = load_board(&store)?;

    if board.card(card_id).is_none() {
        bail!("Card '{card_id}' not found");
    }
    if !board.can_accept(column) {
        bail!(
            "{} is at its WIP limit ({})",
            column.title(),
            board.column(column).wip
        );
    }
    board.move_to(card_id, column, Utc::now());
    save_board(&mut store, &board, Utc::now())?;
    println!("Moved {card_id} to {}", column.title());
    Ok(())
}

fn cmd_rm(cwd: &Path, card_id: u32) -> color_eyre::Result<()> {
    let mut store = open_store(cwd)?;
    let mut board = load_board(&store)?;

    if board.card(card_id).is_none() {
        bail!("Card '{card_id}' not found");
    }
    board.delete_card(card_id);
    save_board(&mut store, &board, Utc::now())?;
    println!("Deleted {card_id}");
    Ok(())
}

fn cmd_wip(cwd: &Path, column: ColumnId, limit: u32) -> color_eyre::Result<()> {
    if limit == 0 {
        bail!("WIP limit must be at least 1");
    }
    let mut store = open_store(cwd)?;
    let mut board = load_board(&store)?;
    board.set_wip(column, limit);
    save_board(&mut store, &board, Utc::now())?;
    println!("{} WIP limit set to {limit}", column.title());
    Ok(())
}

fn cmd_purge(cwd: &Path) -> color_eyre::Result<()> {
    let mut store = open_store(cwd)?;
    let board = load_board(&store)?;
    let now = Utc::now();

    let expired = board.cards.iter().filter(|c| is_expired(now, c)).count();
    // Saving filters expired cards out of the store; nothing else to do.
    save_board(&mut store, &board, now)?;
    println!(
        "{expired} faded card{} purged",
        if expired == 1 { "" } else { "s" }
    );
    Ok(())
}

fn cmd_tui(cwd: &Path) -> color_eyre::Result<()> {
    let mut terminal = ratatui::init();
    let result = app::run(&mut terminal, cwd);
    ratatui::restore();
    result
}
