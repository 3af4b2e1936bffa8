//! Author use-cases and the author side of the archive/restore engine.
//!
//! # Responsibility
//! - Create, look up, list and partially update live authors.
//! - Move an author and its book links into the archive, and back.
//!
//! # Invariants
//! - Archiving never deletes live books; it only copies them.
//! - An existing archived author with the same name is reused (merge) and
//!   the live author is then kept.
//! - Restoring always yields a fresh live author id.

use crate::model::archive::{ArchiveOutcome, ArchivedAuthor, ArchivedAuthorDetail, RestoreOutcome};
use crate::model::author::{Author, AuthorId, AuthorListQuery, AuthorPatch, NewAuthor};
use crate::model::book::{AuthorBookLink, AuthorDetail, BookSummary};
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

/// Author service over one catalog connection.
pub struct AuthorService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> AuthorService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Creates one author after a duplicate check on the normalized name.
    ///
    /// # Errors
    /// - `Validation` for bad fields.
    /// - `Duplicate` when a live author already has this name.
    pub fn create_author(&self, input: NewAuthor) -> CatalogResult<Author> {
        let fields = input.into_fields()?;
        let result = in_transaction(self.conn, |conn| {
            let authors = SqliteAuthorRepository::new(conn);
            if authors.find_author_by_name(&fields.name)?.is_some() {
                return Err(CatalogError::Duplicate(format!(
                    "author `{}` already exists",
                    fields.name
                )));
            }
            let id = authors.create_author(&fields)?;
            authors
                .get_author(id)?
                .ok_or(CatalogError::InconsistentState(
                    "created author not found in read-back",
                ))
        });
        log_outcome("author_create", &fields.name, &result);
        result
    }

    /// Lists live authors, optionally from one country.
    ///
    /// # Errors
    /// - `NotFound` when nothing matches.
    pub fn list_authors(&self, country: Option<&str>) -> CatalogResult<Vec<Author>> {
        let query = AuthorListQuery {
            country: country.map(|value| value.trim().to_string()),
        };
        let authors = SqliteAuthorRepository::new(self.conn).list_authors(&query)?;
        non_empty(authors, || {
            format!("no authors found{}", filter_suffix(query.country.as_deref()))
        })
    }

    /// Loads one live author by name together with its books.
    pub fn author_detail(&self, name: &str) -> CatalogResult<AuthorDetail> {
        let name = normalize_key(name);
        let repo = SqliteAuthorRepository::new(self.conn);
        let author = repo
            .find_author_by_name(&name)?
            .ok_or_else(|| author_not_found(&name))?;
        detail_for(&repo, author)
    }

    /// Loads one live author by surrogate id together with its books.
    pub fn author_detail_by_id(&self, id: AuthorId) -> CatalogResult<AuthorDetail> {
        let repo = SqliteAuthorRepository::new(self.conn);
        let author = repo
            .get_author(id)?
            .ok_or_else(|| CatalogError::NotFound(format!("author {id} not found")))?;
        detail_for(&repo, author)
    }

    /// Applies the fields present in `patch` to the named author.
    ///
    /// # Errors
    /// - `NotFound` when the author does not exist.
    /// - `Validation` when the patched record breaks a field rule.
    pub fn update_author(&self, name: &str, patch: &AuthorPatch) -> CatalogResult<Author> {
        let name = normalize_key(name);
        let result = in_transaction(self.conn, |conn| {
            let authors = SqliteAuthorRepository::new(conn);
            let mut author = authors
                .find_author_by_name(&name)?
                .ok_or_else(|| author_not_found(&name))?;
            if patch.is_empty() {
                return Ok(author);
            }
            patch.apply_to(&mut author.fields);
            author.fields.validate()?;
            authors.update_author(&author)?;
            Ok(author)
        });
        log_outcome("author_update", &name, &result);
        result
    }

    /// Moves the named author into the archive.
    ///
    /// Books linked to the author are copied (once per live book) and linked
    /// to the archived author. When an archived author with this name already
    /// exists it is reused and the live author is kept; otherwise the live
    /// author is deleted together with its live links.
    ///
    /// # Errors
    /// - `NotFound` when no live author has this name, in both branches.
    pub fn archive_author(&self, name: &str) -> CatalogResult<ArchiveOutcome> {
        let name = normalize_key(name);
        let result = in_transaction(self.conn, |conn| {
            let authors = SqliteAuthorRepository::new(conn);
            let archive = SqliteArchiveRepository::new(conn);

            let existing = archive.find_archived_author_by_name(&name)?;
            let live = authors
                .find_author_by_name(&name)?
                .ok_or_else(|| author_not_found(&name))?;

            let (archived_id, merged) = match existing {
                Some(archived) => (archived.id, true),
                None => (archive.archive_author(&live)?, false),
            };

            let books = authors.list_books_for_author(live.id)?;
            let mut links_created = 0;
            for book in &books {
                let archived_book_id = match archive.find_archived_book_by_original_id(book.id)? {
                    Some(archived_book) => archived_book.id,
                    None => archive.archive_book(book)?,
                };
                if archive.link_archived(archived_id, archived_book_id)? {
                    links_created += 1;
                }
            }

            if !merged {
                authors.delete_author(live.id)?;
            }

            Ok(ArchiveOutcome {
                archived_id,
                merged,
                counterparts: books.len(),
                links_created,
            })
        });

        match &result {
            Ok(outcome) => info!(
                "event=author_archive module=service status=ok key={name:?} archived_id={} merged={} books={} links_created={}",
                outcome.archived_id, outcome.merged, outcome.counterparts, outcome.links_created
            ),
            Err(err) => log_failure("author_archive", &name, err),
        }
        result
    }

    /// Lists archived authors, optionally from one country.
    pub fn list_archived_authors(&self, country: Option<&str>) -> CatalogResult<Vec<ArchivedAuthor>> {
        let query = AuthorListQuery {
            country: country.map(|value| value.trim().to_string()),
        };
        let authors = SqliteArchiveRepository::new(self.conn).list_archived_authors(&query)?;
        non_empty(authors, || {
            format!(
                "no archived authors found{}",
                filter_suffix(query.country.as_deref())
            )
        })
    }

    /// Loads the archived author with this name and its archived book titles.
    pub fn find_archived_author(&self, name: &str) -> CatalogResult<ArchivedAuthorDetail> {
        let name = normalize_key(name);
        let archive = SqliteArchiveRepository::new(self.conn);
        let author = archive
            .find_archived_author_by_name(&name)?
            .ok_or_else(|| not_in_archive(&name))?;

        let mut book_titles = Vec::new();
        for link in archive.list_links_for_archived_author(author.id)? {
            if let Some(book) = archive.get_archived_book(link.archived_book_id)? {
                book_titles.push(book.fields.title);
            }
        }
        Ok(ArchivedAuthorDetail {
            author,
            book_titles,
        })
    }

    /// Moves the named archived author back into the live catalog.
    ///
    /// The author gets a fresh live id. Each archived book link is rebuilt:
    /// a live book with the same ISBN is reused, otherwise the archived copy
    /// is re-created with a fresh id. The archived author row and its archive
    /// links are removed; archived book copies stay.
    ///
    /// # Errors
    /// - `NotFound` when the author is not in the archive.
    /// - `Duplicate` when a live author already has this name, or a book to
    ///   re-create collides with a live title.
    pub fn restore_author(&self, name: &str) -> CatalogResult<RestoreOutcome> {
        let name = normalize_key(name);
        let result = in_transaction(self.conn, |conn| {
            let authors = SqliteAuthorRepository::new(conn);
            let books = SqliteBookRepository::new(conn);
            let archive = SqliteArchiveRepository::new(conn);

            let archived = archive
                .find_archived_author_by_name(&name)?
                .ok_or_else(|| not_in_archive(&name))?;
            if authors.find_author_by_name(&archived.fields.name)?.is_some() {
                return Err(CatalogError::Duplicate(format!(
                    "author `{name}` already exists in the catalog"
                )));
            }
            let author_id = authors.create_author(&archived.fields)?;

            let links = archive.list_links_for_archived_author(archived.id)?;
            let mut links_restored = 0;
            let mut counterparts_created = 0;
            for link in &links {
                let Some(archived_book) = archive.get_archived_book(link.archived_book_id)? else {
                    continue;
                };
                let book_id = match books.find_book_by_isbn(&archived_book.fields.isbn)? {
                    Some(live) => live.id,
                    None => {
                        if books.find_book_by_title(&archived_book.fields.title)?.is_some() {
                            return Err(CatalogError::Duplicate(format!(
                                "book `{}` already exists in the catalog with another ISBN",
                                archived_book.fields.title
                            )));
                        }
                        counterparts_created += 1;
                        books.create_book(&archived_book.fields)?
                    }
                };
                if books.create_link(&AuthorBookLink { author_id, book_id })? {
                    links_restored += 1;
                }
            }

            archive.delete_archived_author(archived.id)?;

            Ok(RestoreOutcome {
                restored_id: author_id,
                links_restored,
                counterparts_created,
            })
        });

        match &result {
            Ok(outcome) => info!(
                "event=author_restore module=service status=ok key={name:?} restored_id={} links_restored={} books_created={}",
                outcome.restored_id, outcome.links_restored, outcome.counterparts_created
            ),
            Err(err) => log_failure("author_restore", &name, err),
        }
        result
    }
}

fn detail_for(repo: &SqliteAuthorRepository<'_>, author: Author) -> CatalogResult<AuthorDetail> {
    let books: Vec<BookSummary> = repo
        .list_books_for_author(author.id)?
        .iter()
        .map(BookSummary::from)
        .collect();
    Ok(AuthorDetail {
        book_count: books.len(),
        author,
        books,
    })
}

fn author_not_found(name: &str) -> CatalogError {
    CatalogError::NotFound(format!("author `{name}` not found"))
}

fn not_in_archive(name: &str) -> CatalogError {
    CatalogError::NotFound(format!("author `{name}` is not in the archive"))
}
