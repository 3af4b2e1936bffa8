//! Archived (deposit) copies of authors and books.
//!
//! # Invariants
//! - Archive ids are independent from live ids; `original_id` is only a
//!   back-reference to the live row the copy was taken from.
//! - `archived_at` is epoch milliseconds, set by storage.
//! - Archived names, titles and ISBNs are not unique.

use crate::model::author::{AuthorFields, AuthorId};
use crate::model::book::{BookFields, BookId};
use serde::{Deserialize, Serialize};

pub type ArchivedAuthorId = i64;
pub type ArchivedBookId = i64;

/// Historical copy of an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedAuthor {
    pub id: ArchivedAuthorId,
    /// Live id at the time the copy was taken.
    pub original_id: AuthorId,
    pub archived_at: i64,
    #[serde(flatten)]
    pub fields: AuthorFields,
}

/// Historical copy of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedBook {
    pub id: ArchivedBookId,
    pub original_id: BookId,
    pub archived_at: i64,
    #[serde(flatten)]
    pub fields: BookFields,
}

/// One edge of the archived author/book relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedLink {
    pub archived_author_id: ArchivedAuthorId,
    pub archived_book_id: ArchivedBookId,
    pub archived_at: i64,
}

/// Archive lookup view for an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedAuthorDetail {
    #[serde(flatten)]
    pub author: ArchivedAuthor,
    /// Titles of the archived books linked to this author.
    pub book_titles: Vec<String>,
}

/// Archive lookup view for a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedBookDetail {
    #[serde(flatten)]
    pub book: ArchivedBook,
    /// Names of the archived authors linked to this book.
    pub author_names: Vec<String>,
}

/// Result of moving one live entity into the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveOutcome {
    /// Archive row that now represents the entity.
    pub archived_id: i64,
    /// `true` when an existing archive row was reused and the live row kept.
    pub merged: bool,
    /// Linked counterparts scanned (books of an author, authors of a book).
    pub counterparts: usize,
    /// Archive links inserted; already present pairs are not counted.
    pub links_created: usize,
}

/// Result of moving one archived entity back into the live catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreOutcome {
    /// Fresh live id of the restored entity.
    pub restored_id: i64,
    /// Live links rebuilt from archive links.
    pub links_restored: usize,
    /// Counterparts created in the live catalog; the rest were reused.
    pub counterparts_created: usize,
}
