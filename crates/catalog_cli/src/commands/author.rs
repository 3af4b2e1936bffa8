//! Author CLI commands

use anyhow::Result;
use catalog_core::{AuthorPatch, AuthorService, NewAuthor};
use clap::Subcommand;
use rusqlite::Connection;

use super::print_json;

/// Author subcommands
#[derive(Subcommand)]
pub enum AuthorCommands {
    /// Register a new author
    Create {
        /// Full name
        name: String,
        /// Country of origin
        #[arg(short, long)]
        country: String,
        /// Birth year
        #[arg(short, long)]
        birth_year: String,
        /// Short biography
        #[arg(short, long)]
        description: Option<String>,
        /// Death year
        #[arg(long)]
        death_year: Option<String>,
    },
    /// List live authors
    List {
        /// Only authors from this country
        #[arg(short, long)]
        country: Option<String>,
    },
    /// Show one author and its books
    Show {
        /// Author name
        name: String,
    },
    /// Show one author by id
    ShowId {
        /// Author id
        id: i64,
    },
    /// Update description or death year
    Update {
        /// Author name
        name: String,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New death year
        #[arg(long, conflicts_with = "clear_death_year")]
        death_year: Option<String>,
        /// Remove the death year
        #[arg(long)]
        clear_death_year: bool,
    },
    /// Move an author and its book links into the archive
    Archive {
        /// Author name
        name: String,
    },
    /// List archived authors
    Archived {
        /// Only authors from this country
        #[arg(short, long)]
        country: Option<String>,
    },
    /// Show an archived author and its archived books
    FindArchived {
        /// Author name
        name: String,
    },
    /// Bring an archived author back into the catalog
    Restore {
        /// Author name
        name: String,
    },
}

/// Handle an author command
pub fn handle_author_command(conn: &Connection, cmd: AuthorCommands) -> Result<()> {
    let service = AuthorService::new(conn);

    match cmd {
        AuthorCommands::Create {
            name,
            country,
            birth_year,
            description,
            death_year,
        } => {
            let request = NewAuthor {
                name,
                country,
                description,
                birth_year,
                death_year,
            };
            print_json(&service.create_author(request)?)
        }
        AuthorCommands::List { country } => print_json(&service.list_authors(country.as_deref())?),
        AuthorCommands::Show { name } => print_json(&service.author_detail(&name)?),
        AuthorCommands::ShowId { id } => print_json(&service.author_detail_by_id(id)?),
        AuthorCommands::Update {
            name,
            description,
            death_year,
            clear_death_year,
        } => {
            let patch = AuthorPatch {
                description,
                death_year: if clear_death_year {
                    Some(None)
                } else {
                    death_year.map(Some)
                },
            };
            print_json(&service.update_author(&name, &patch)?)
        }
        AuthorCommands::Archive { name } => print_json(&service.archive_author(&name)?),
        AuthorCommands::Archived { country } => {
            print_json(&service.list_archived_authors(country.as_deref())?)
        }
        AuthorCommands::FindArchived { name } => print_json(&service.find_archived_author(&name)?),
        AuthorCommands::Restore { name } => print_json(&service.restore_author(&name)?),
    }
}
