//! Book CLI commands

use anyhow::Result;
use catalog_core::{BookPatch, BookService, NewBook};
use clap::Subcommand;
use rusqlite::Connection;

use super::print_json;

/// Book subcommands
#[derive(Subcommand)]
pub enum BookCommands {
    /// Register a new book linked to existing authors
    Create {
        /// Book title
        title: String,
        /// ISBN
        #[arg(short, long)]
        isbn: String,
        /// Author name (repeat for co-authors)
        #[arg(short, long = "author")]
        authors: Vec<String>,
        /// Short summary
        #[arg(short, long)]
        summary: Option<String>,
        /// Number of pages
        #[arg(long)]
        page_count: Option<i64>,
        /// Publisher name
        #[arg(short, long)]
        publisher: Option<String>,
        /// Publication year
        #[arg(short, long)]
        year: Option<i32>,
        /// Copies on the shelf (defaults to 1)
        #[arg(long)]
        copies: Option<i64>,
    },
    /// List live books
    List {
        /// Only books published in this year
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Show one book and its authors
    Show {
        /// Book title
        title: String,
    },
    /// Show one book by id
    ShowId {
        /// Book id
        id: i64,
    },
    /// Update book details
    Update {
        /// Book title
        title: String,
        #[arg(short, long, conflicts_with = "clear_summary")]
        summary: Option<String>,
        #[arg(long)]
        clear_summary: bool,
        #[arg(long, conflicts_with = "clear_page_count")]
        page_count: Option<i64>,
        #[arg(long)]
        clear_page_count: bool,
        #[arg(short, long, conflicts_with = "clear_publisher")]
        publisher: Option<String>,
        #[arg(long)]
        clear_publisher: bool,
        #[arg(short, long, conflicts_with = "clear_year")]
        year: Option<i32>,
        #[arg(long)]
        clear_year: bool,
        /// Copies on the shelf
        #[arg(long)]
        copies: Option<i64>,
    },
    /// Move a book and its author links into the archive
    Archive {
        /// Book title
        title: String,
    },
    /// List archived books
    Archived {
        /// Only books published in this year
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Show an archived book and its archived authors
    FindArchived {
        /// Book title
        title: String,
    },
    /// Bring an archived book back into the catalog
    Restore {
        /// Book title
        title: String,
    },
}

/// Handle a book command
pub fn handle_book_command(conn: &Connection, cmd: BookCommands) -> Result<()> {
    let service = BookService::new(conn);

    match cmd {
        BookCommands::Create {
            title,
            isbn,
            authors,
            summary,
            page_count,
            publisher,
            year,
            copies,
        } => {
            let request = NewBook {
                title,
                isbn,
                summary,
                page_count,
                publisher,
                publication_year: year,
                copies_available: copies,
                author_names: authors,
            };
            print_json(&service.create_book(request)?)
        }
        BookCommands::List { year } => print_json(&service.list_books(year)?),
        BookCommands::Show { title } => print_json(&service.book_detail(&title)?),
        BookCommands::ShowId { id } => print_json(&service.book_detail_by_id(id)?),
        BookCommands::Update {
            title,
            summary,
            clear_summary,
            page_count,
            clear_page_count,
            publisher,
            clear_publisher,
            year,
            clear_year,
            copies,
        } => {
            let patch = BookPatch {
                summary: present_or_cleared(summary, clear_summary),
                page_count: present_or_cleared(page_count, clear_page_count),
                publisher: present_or_cleared(publisher, clear_publisher),
                publication_year: present_or_cleared(year, clear_year),
                copies_available: copies,
            };
            print_json(&service.update_book(&title, &patch)?)
        }
        BookCommands::Archive { title } => print_json(&service.archive_book(&title)?),
        BookCommands::Archived { year } => print_json(&service.list_archived_books(year)?),
        BookCommands::FindArchived { title } => print_json(&service.find_archived_book(&title)?),
        BookCommands::Restore { title } => print_json(&service.restore_book(&title)?),
    }
}

/// Maps a value flag and its `--clear-*` twin onto a nullable patch field.
fn present_or_cleared<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}
