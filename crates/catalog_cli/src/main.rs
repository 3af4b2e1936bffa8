//! `catalog` command-line front end.
//!
//! # Responsibility
//! - Parse arguments into typed commands and call the catalog services.
//! - Print results as JSON on stdout and failures as `{status, detail}` on
//!   stderr with a non-zero exit code.

mod commands;
mod config;

use anyhow::{Context, Result};
use catalog_core::CatalogError;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::commands::{handle_author_command, handle_book_command, AuthorCommands, BookCommands};
use crate::config::Settings;

#[derive(Parser)]
#[command(
    name = "catalog",
    version,
    about = "Book catalog with an archive for retired authors and books"
)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "CATALOG_DB_PATH")]
    db: Option<PathBuf>,

    /// Directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "CATALOG_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "CATALOG_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Author management commands
    #[command(subcommand)]
    Author(AuthorCommands),

    /// Book management commands
    #[command(subcommand)]
    Book(BookCommands),

    /// Print CLI and core versions
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Version = cli.command {
        println!(
            "{}",
            serde_json::json!({
                "cli": env!("CARGO_PKG_VERSION"),
                "core": catalog_core::core_version(),
            })
        );
        return Ok(());
    }

    let settings = Settings::resolve(cli.db, cli.log_dir, cli.log_level)?;
    if let Some(log_dir) = settings.log_dir.as_deref() {
        catalog_core::init_logging(&settings.log_level, log_dir)
            .map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))?;
    }
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        settings.db_path.display()
    );

    let conn = catalog_core::open_db(&settings.db_path).with_context(|| {
        format!("failed to open catalog at `{}`", settings.db_path.display())
    })?;

    match cli.command {
        Commands::Author(cmd) => handle_author_command(&conn, cmd),
        Commands::Book(cmd) => handle_book_command(&conn, cmd),
        Commands::Version => Ok(()),
    }
}

fn report_failure(err: &anyhow::Error) {
    let (status, detail) = match err.downcast_ref::<CatalogError>() {
        Some(catalog_err) => (catalog_err.status_code(), catalog_err.to_string()),
        None => (500, format!("{err:#}")),
    };
    eprintln!("{}", serde_json::json!({ "status": status, "detail": detail }));
}
