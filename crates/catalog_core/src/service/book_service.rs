//! Book use-cases and the book side of the archive/restore engine.
//!
//! # Invariants
//! - A book is created only when every named author exists.
//! - Archiving requires at least one linked author and an ISBN not yet in
//!   the archive; the live book is always deleted afterwards.
//! - Archiving a book never deletes live authors.

use crate::model::archive::{ArchiveOutcome, ArchivedBook, ArchivedBookDetail, RestoreOutcome};
use crate::model::author::{AuthorSummary, AuthorId};
use crate::model::book::{AuthorBookLink, Book, BookDetail, BookId, BookListQuery, BookPatch, NewBook};
use crate::model::validation::normalize_key;
use crate::repo::archive_repo::{ArchiveRepository, SqliteArchiveRepository};
use crate::repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
use crate::repo::book_repo::{BookRepository, SqliteBookRepository};
use crate::service::{
    filter_suffix, in_transaction, log_failure, log_outcome, non_empty, CatalogError,
    CatalogResult,
};
use log::info;
use rusqlite::Connection;

/// Book service over one catalog connection.
pub struct BookService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> BookService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Creates one book and links it to the named authors.
    ///
    /// # Errors
    /// - `Validation` for bad fields.
    /// - `Duplicate` when the ISBN or title is already in the live catalog.
    /// - `NotFound` when a named author does not exist; nothing is written.
    pub fn create_book(&self, input: NewBook) -> CatalogResult<BookDetail> {
        let (fields, author_names) = input.into_parts()?;
        let result = in_transaction(self.conn, |conn| {
            let authors = SqliteAuthorRepository::new(conn);
            let books = SqliteBookRepository::new(conn);

            if books.find_book_by_isbn(&fields.isbn)?.is_some() {
                return Err(CatalogError::Duplicate(format!(
                    "a book with ISBN `{}` already exists",
                    fields.isbn
                )));
            }
            if books.find_book_by_title(&fields.title)?.is_some() {
                return Err(CatalogError::Duplicate(format!(
                    "book `{}` already exists",
                    fields.title
                )));
            }

            let mut author_ids: Vec<AuthorId> = Vec::with_capacity(author_names.len());
            for name in &author_names {
                let author = authors.find_author_by_name(name)?.ok_or_else(|| {
                    CatalogError::NotFound(format!("author `{name}` is not registered"))
                })?;
                author_ids.push(author.id);
            }

            let book_id = books.create_book(&fields)?;
            for author_id in author_ids {
                books.create_link(&AuthorBookLink { author_id, book_id })?;
            }

            let book = books.get_book(book_id)?.ok_or(CatalogError::InconsistentState(
                "created book not found in read-back",
            ))?;
            detail_for(&books, book)
        });
        log_outcome("book_create", &fields.isbn, &result);
        result
    }

    /// Lists live books, optionally published in one year.
    ///
    /// # Errors
    /// - `NotFound` when nothing matches.
    pub fn list_books(&self, publication_year: Option<i32>) -> CatalogResult<Vec<Book>> {
        let query = BookListQuery { publication_year };
        let books = SqliteBookRepository::new(self.conn).list_books(&query)?;
        non_empty(books, || {
            format!("no books found{}", filter_suffix(publication_year))
        })
    }

    /// Loads one live book by title together with its authors.
    pub fn book_detail(&self, title: &str) -> CatalogResult<BookDetail> {
        let title = normalize_key(title);
        let books = SqliteBookRepository::new(self.conn);
        let book = books
            .find_book_by_title(&title)?
            .ok_or_else(|| book_not_found(&title))?;
        detail_for(&books, book)
    }

    /// Loads one live book by surrogate id together with its authors.
    pub fn book_detail_by_id(&self, id: BookId) -> CatalogResult<BookDetail> {
        let books = SqliteBookRepository::new(self.conn);
        let book = books
            .get_book(id)?
            .ok_or_else(|| CatalogError::NotFound(format!("book {id} not found")))?;
        detail_for(&books, book)
    }

    /// Applies the fields present in `patch` to the book with this title.
    pub fn update_book(&self, title: &str, patch: &BookPatch) -> CatalogResult<Book> {
        let title = normalize_key(title);
        let result = in_transaction(self.conn, |conn| {
            let books = SqliteBookRepository::new(conn);
            let mut book = books
                .find_book_by_title(&title)?
                .ok_or_else(|| book_not_found(&title))?;
            if patch.is_empty() {
                return Ok(book);
            }
            patch.apply_to(&mut book.fields);
            book.fields.validate()?;
            books.update_book(&book)?;
            Ok(book)
        });
        log_outcome("book_update", &title, &result);
        result
    }

    /// Moves the book with this title into the archive.
    ///
    /// Each linked author is matched to an archived author by name, or copied
    /// into the archive, and linked to the archived book. The live book and
    /// its live links are then deleted; live authors stay.
    ///
    /// # Errors
    /// - `NotFound` when no live book has this title.
    /// - `MissingRelationship` when the book has no authors.
    /// - `Duplicate` when an archived book already has this ISBN.
    pub fn archive_book(&self, title: &str) -> CatalogResult<ArchiveOutcome> {
        let title = normalize_key(title);
        let result = in_transaction(self.conn, |conn| {
            let books = SqliteBookRepository::new(conn);
            let archive = SqliteArchiveRepository::new(conn);

            let book = books
                .find_book_by_title(&title)?
                .ok_or_else(|| book_not_found(&title))?;
            let authors = books.list_authors_for_book(book.id)?;
            if authors.is_empty() {
                return Err(CatalogError::MissingRelationship(format!(
                    "book `{title}` has no authors and cannot be archived"
                )));
            }
            if archive
                .find_archived_book_by_isbn(&book.fields.isbn)?
                .is_some()
            {
                return Err(CatalogError::Duplicate(format!(
                    "a book with ISBN `{}` is already in the archive",
                    book.fields.isbn
                )));
            }

            let archived_id = archive.archive_book(&book)?;
            let mut links_created = 0;
            for author in &authors {
                let archived_author_id =
                    match archive.find_archived_author_by_name(&author.fields.name)? {
                        Some(archived_author) => archived_author.id,
                        None => archive.archive_author(author)?,
                    };
                if archive.link_archived(archived_author_id, archived_id)? {
                    links_created += 1;
                }
            }

            books.delete_book(book.id)?;

            Ok(ArchiveOutcome {
                archived_id,
                merged: false,
                counterparts: authors.len(),
                links_created,
            })
        });

        match &result {
            Ok(outcome) => info!(
                "event=book_archive module=service status=ok key={title:?} archived_id={} authors={} links_created={}",
                outcome.archived_id, outcome.counterparts, outcome.links_created
            ),
            Err(err) => log_failure("book_archive", &title, err),
        }
        result
    }

    /// Lists archived books, optionally published in one year.
    pub fn list_archived_books(&self, publication_year: Option<i32>) -> CatalogResult<Vec<ArchivedBook>> {
        let query = BookListQuery { publication_year };
        let books = SqliteArchiveRepository::new(self.conn).list_archived_books(&query)?;
        non_empty(books, || {
            format!("no archived books found{}", filter_suffix(publication_year))
        })
    }

    /// Loads the archived book with this title and its archived author names.
    pub fn find_archived_book(&self, title: &str) -> CatalogResult<ArchivedBookDetail> {
        let title = normalize_key(title);
        let archive = SqliteArchiveRepository::new(self.conn);
        let book = archive
            .find_archived_book_by_title(&title)?
            .ok_or_else(|| not_in_archive(&title))?;

        let mut author_names = Vec::new();
        for link in archive.list_links_for_archived_book(book.id)? {
            if let Some(author) = archive.get_archived_author(link.archived_author_id)? {
                author_names.push(author.fields.name);
            }
        }
        Ok(ArchivedBookDetail { book, author_names })
    }

    /// Moves the archived book with this title back into the live catalog.
    ///
    /// The book gets a fresh live id. Each archived author link is rebuilt
    /// against the live author with the same name, created from the archived
    /// copy when absent. The archived book row and its archive links are
    /// removed; archived author copies stay.
    ///
    /// # Errors
    /// - `NotFound` when the book is not in the archive.
    /// - `Duplicate` when a live book already has this ISBN or title.
    pub fn restore_book(&self, title: &str) -> CatalogResult<RestoreOutcome> {
        let title = normalize_key(title);
        let result = in_transaction(self.conn, |conn| {
            let authors = SqliteAuthorRepository::new(conn);
            let books = SqliteBookRepository::new(conn);
            let archive = SqliteArchiveRepository::new(conn);

            let archived = archive
                .find_archived_book_by_title(&title)?
                .ok_or_else(|| not_in_archive(&title))?;
            if books.find_book_by_isbn(&archived.fields.isbn)?.is_some()
                || books.find_book_by_title(&archived.fields.title)?.is_some()
            {
                return Err(CatalogError::Duplicate(format!(
                    "book `{title}` or its ISBN `{}` already exists in the catalog",
                    archived.fields.isbn
                )));
            }
            let book_id = books.create_book(&archived.fields)?;

            let mut links_restored = 0;
            let mut counterparts_created = 0;
            for link in archive.list_links_for_archived_book(archived.id)? {
                let Some(archived_author) = archive.get_archived_author(link.archived_author_id)?
                else {
                    continue;
                };
                let author_id = match authors.find_author_by_name(&archived_author.fields.name)? {
                    Some(live) => live.id,
                    None => {
                        counterparts_created += 1;
                        authors.create_author(&archived_author.fields)?
                    }
                };
                if books.create_link(&AuthorBookLink { author_id, book_id })? {
                    links_restored += 1;
                }
            }

            archive.delete_archived_book(archived.id)?;

            Ok(RestoreOutcome {
                restored_id: book_id,
                links_restored,
                counterparts_created,
            })
        });

        match &result {
            Ok(outcome) => info!(
                "event=book_restore module=service status=ok key={title:?} restored_id={} links_restored={} authors_created={}",
                outcome.restored_id, outcome.links_restored, outcome.counterparts_created
            ),
            Err(err) => log_failure("book_restore", &title, err),
        }
        result
    }
}

fn detail_for(books: &SqliteBookRepository<'_>, book: Book) -> CatalogResult<BookDetail> {
    let authors = books
        .list_authors_for_book(book.id)?
        .iter()
        .map(AuthorSummary::from)
        .collect();
    Ok(BookDetail { book, authors })
}

fn book_not_found(title: &str) -> CatalogError {
    CatalogError::NotFound(format!("book `{title}` not found"))
}

fn not_in_archive(title: &str) -> CatalogError {
    CatalogError::NotFound(format!("book `{title}` is not in the archive"))
}
