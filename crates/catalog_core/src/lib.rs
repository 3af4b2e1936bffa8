//! Core domain logic for the book catalog and its archive.
//! This crate is the single source of truth for catalog invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::archive::{
    ArchiveOutcome, ArchivedAuthor, ArchivedAuthorDetail, ArchivedBook, ArchivedBookDetail,
    ArchivedLink, RestoreOutcome,
};
pub use model::author::{Author, AuthorFields, AuthorId, AuthorPatch, AuthorSummary, NewAuthor};
pub use model::book::{
    AuthorDetail, Book, BookDetail, BookFields, BookId, BookPatch, BookSummary, NewBook,
};
pub use model::validation::ValidationError;
pub use repo::{RepoError, RepoResult};
pub use service::author_service::AuthorService;
pub use service::book_service::BookService;
pub use service::{CatalogError, CatalogResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
