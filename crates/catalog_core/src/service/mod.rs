//! Catalog use-case services and the archive/restore engine.
//!
//! # Responsibility
//! - Orchestrate repositories into the catalog operations exposed to callers.
//! - Map storage outcomes onto the caller-facing error taxonomy.
//!
//! # Invariants
//! - Every mutating operation runs in one immediate transaction; a failure
//!   leaves no partial writes behind.
//! - Empty listings are reported as `NotFound`, never as empty success.

use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use log::{info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod author_service;
pub mod book_service;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Caller-facing failure of a catalog operation.
#[derive(Debug)]
pub enum CatalogError {
    /// Request fields failed validation.
    Validation(ValidationError),
    /// Target entity is absent from the targeted store, or a listing is empty.
    NotFound(String),
    /// Natural-key collision.
    Duplicate(String),
    /// Book has no linked authors and cannot be archived.
    MissingRelationship(String),
    /// A write could not be read back.
    InconsistentState(&'static str),
    /// Storage failure.
    Repo(RepoError),
}

impl CatalogError {
    /// HTTP-style status code for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Duplicate(_) | Self::MissingRelationship(_) => 400,
            Self::Validation(_) => 422,
            Self::InconsistentState(_) | Self::Repo(_) => 500,
        }
    }

    /// Stable snake_case code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Duplicate(_) => "duplicate",
            Self::MissingRelationship(_) => "missing_relationship",
            Self::InconsistentState(_) => "inconsistent_state",
            Self::Repo(_) => "storage",
        }
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(message)
            | Self::Duplicate(message)
            | Self::MissingRelationship(message) => write!(f, "{message}"),
            Self::InconsistentState(details) => write!(f, "inconsistent catalog state: {details}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { table, id } => {
                Self::NotFound(format!("row {id} not found in `{table}`"))
            }
            other => Self::Repo(other),
        }
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Runs `work` inside a `BEGIN IMMEDIATE` transaction.
///
/// Commits on `Ok`; the transaction is rolled back when `work` fails.
pub(crate) fn in_transaction<T, F>(conn: &Connection, work: F) -> CatalogResult<T>
where
    F: FnOnce(&Connection) -> CatalogResult<T>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let value = work(&tx)?;
    tx.commit()?;
    Ok(value)
}

/// Fails with `NotFound(message)` when a listing came back empty.
pub(crate) fn non_empty<T>(items: Vec<T>, message: impl FnOnce() -> String) -> CatalogResult<Vec<T>> {
    if items.is_empty() {
        return Err(CatalogError::NotFound(message()));
    }
    Ok(items)
}

/// Renders `" from <filter>"` for listing messages, or nothing.
pub(crate) fn filter_suffix<T: Display>(filter: Option<T>) -> String {
    filter
        .map(|value| format!(" from {value}"))
        .unwrap_or_default()
}

pub(crate) fn log_outcome<T>(event: &'static str, key: &str, result: &CatalogResult<T>) {
    match result {
        Ok(_) => info!("event={event} module=service status=ok key={key:?}"),
        Err(err) => log_failure(event, key, err),
    }
}

pub(crate) fn log_failure(event: &'static str, key: &str, err: &CatalogError) {
    warn!(
        "event={event} module=service status=error key={key:?} error_code={} error={err}",
        err.code()
    );
}
