//! Repository contracts and SQLite implementations for both stores.
//!
//! # Responsibility
//! - Keep SQL for the live catalog and the archive behind narrow traits.
//! - Translate rows into model records and reject invalid persisted state.
//!
//! # Invariants
//! - Repositories never start transactions; callers own the unit of work.
//! - Lookups by natural key expect already-normalized input.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod archive_repo;
pub mod author_repo;
pub mod book_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error shared by all catalog repositories.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Write targeted a row that does not exist.
    NotFound { table: &'static str, id: i64 },
    /// A stored row failed model validation.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "row {id} not found in `{table}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn invalid_row(table: &'static str, id: i64, err: ValidationError) -> RepoError {
    RepoError::InvalidData(format!("{table}.id={id}: {err}"))
}

pub(crate) fn ensure_changed(changed: usize, table: &'static str, id: i64) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound { table, id });
    }
    Ok(())
}
