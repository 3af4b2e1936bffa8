//! CLI command handlers
//!
//! Bridges clap argument parsing with the catalog services. Every handler
//! prints its result as pretty JSON on stdout.

pub mod author;
pub mod book;

pub use author::{handle_author_command, AuthorCommands};
pub use book::{handle_book_command, BookCommands};

use anyhow::{Context, Result};
use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{rendered}");
    Ok(())
}
