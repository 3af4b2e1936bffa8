//! Archive (deposit) repository.
//!
//! # Responsibility
//! - Store historical copies of authors and books and their links.
//! - Resolve archived rows by name/title/ISBN or by the live id they came from.
//!
//! # Invariants
//! - Copies are taken verbatim from live records; `original_id` keeps the
//!   live id as a plain value.
//! - Archive links only reference archive ids.
//! - Deleting an archived row cascades to its archive links and to nothing
//!   else.
//! - Lookups by non-unique keys return the oldest matching copy.

use crate::model::archive::{
    ArchivedAuthor, ArchivedAuthorId, ArchivedBook, ArchivedBookId, ArchivedLink,
};
use crate::model::author::{Author, AuthorFields, AuthorListQuery};
use crate::model::book::{Book, BookFields, BookId, BookListQuery};
use crate::repo::{ensure_changed, invalid_row, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const ARCHIVED_AUTHOR_SELECT_SQL: &str = "SELECT
    id,
    original_id,
    archived_at,
    name,
    country,
    description,
    birth_year,
    death_year
FROM archived_authors";

const ARCHIVED_BOOK_SELECT_SQL: &str = "SELECT
    id,
    original_id,
    archived_at,
    title,
    isbn,
    summary,
    page_count,
    publisher,
    publication_year,
    copies_available
FROM archived_books";

const ARCHIVED_LINK_SELECT_SQL: &str = "SELECT
    archived_author_id,
    archived_book_id,
    archived_at
FROM archived_author_books";

/// Repository interface for the archive store.
pub trait ArchiveRepository {
    /// Copies a live author into the archive and returns the archive id.
    fn archive_author(&self, source: &Author) -> RepoResult<ArchivedAuthorId>;
    fn get_archived_author(&self, id: ArchivedAuthorId) -> RepoResult<Option<ArchivedAuthor>>;
    fn find_archived_author_by_name(&self, name: &str) -> RepoResult<Option<ArchivedAuthor>>;
    fn list_archived_authors(&self, query: &AuthorListQuery) -> RepoResult<Vec<ArchivedAuthor>>;
    fn delete_archived_author(&self, id: ArchivedAuthorId) -> RepoResult<()>;

    /// Copies a live book into the archive and returns the archive id.
    fn archive_book(&self, source: &Book) -> RepoResult<ArchivedBookId>;
    fn get_archived_book(&self, id: ArchivedBookId) -> RepoResult<Option<ArchivedBook>>;
    /// Finds the copy taken from a given live book.
    fn find_archived_book_by_original_id(
        &self,
        original_id: BookId,
    ) -> RepoResult<Option<ArchivedBook>>;
    fn find_archived_book_by_isbn(&self, isbn: &str) -> RepoResult<Option<ArchivedBook>>;
    fn find_archived_book_by_title(&self, title: &str) -> RepoResult<Option<ArchivedBook>>;
    fn list_archived_books(&self, query: &BookListQuery) -> RepoResult<Vec<ArchivedBook>>;
    fn delete_archived_book(&self, id: ArchivedBookId) -> RepoResult<()>;

    /// Links two archived rows. Returns `false` when the pair already existed.
    fn link_archived(
        &self,
        author_id: ArchivedAuthorId,
        book_id: ArchivedBookId,
    ) -> RepoResult<bool>;
    fn list_links_for_archived_author(
        &self,
        author_id: ArchivedAuthorId,
    ) -> RepoResult<Vec<ArchivedLink>>;
    fn list_links_for_archived_book(&self, book_id: ArchivedBookId)
        -> RepoResult<Vec<ArchivedLink>>;
}

/// SQLite-backed archive repository.
pub struct SqliteArchiveRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArchiveRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn first_author_where(
        &self,
        clause: &'static str,
        value: Value,
    ) -> RepoResult<Option<ArchivedAuthor>> {
        self.conn
            .query_row(
                &format!("{ARCHIVED_AUTHOR_SELECT_SQL} WHERE {clause} ORDER BY id ASC LIMIT 1;"),
                [value],
                |row| Ok(parse_archived_author_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn first_book_where(
        &self,
        clause: &'static str,
        value: Value,
    ) -> RepoResult<Option<ArchivedBook>> {
        self.conn
            .query_row(
                &format!("{ARCHIVED_BOOK_SELECT_SQL} WHERE {clause} ORDER BY id ASC LIMIT 1;"),
                [value],
                |row| Ok(parse_archived_book_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn links_where(&self, clause: &'static str, id: i64) -> RepoResult<Vec<ArchivedLink>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ARCHIVED_LINK_SELECT_SQL} WHERE {clause}
             ORDER BY archived_author_id ASC, archived_book_id ASC;"
        ))?;
        let links = stmt
            .query_map([id], |row| {
                Ok(ArchivedLink {
                    archived_author_id: row.get("archived_author_id")?,
                    archived_book_id: row.get("archived_book_id")?,
                    archived_at: row.get("archived_at")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }
}

impl ArchiveRepository for SqliteArchiveRepository<'_> {
    fn archive_author(&self, source: &Author) -> RepoResult<ArchivedAuthorId> {
        let fields = &source.fields;
        self.conn.execute(
            "INSERT INTO archived_authors (
                original_id,
                name,
                country,
                description,
                birth_year,
                death_year
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                source.id,
                fields.name.as_str(),
                fields.country.as_str(),
                fields.description.as_str(),
                fields.birth_year.as_str(),
                fields.death_year.as_deref(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_archived_author(&self, id: ArchivedAuthorId) -> RepoResult<Option<ArchivedAuthor>> {
        self.first_author_where("id = ?1", Value::Integer(id))
    }

    fn find_archived_author_by_name(&self, name: &str) -> RepoResult<Option<ArchivedAuthor>> {
        self.first_author_where("name = ?1", Value::Text(name.to_string()))
    }

    fn list_archived_authors(&self, query: &AuthorListQuery) -> RepoResult<Vec<ArchivedAuthor>> {
        let mut sql = format!("{ARCHIVED_AUTHOR_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(country) = query.country.as_ref() {
            sql.push_str(" AND country = ?");
            bind_values.push(Value::Text(country.clone()));
        }
        sql.push_str(" ORDER BY id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(parse_archived_author_row(row)?);
        }
        Ok(authors)
    }

    fn delete_archived_author(&self, id: ArchivedAuthorId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM archived_authors WHERE id = ?1;", [id])?;
        ensure_changed(changed, "archived_authors", id)
    }

    fn archive_book(&self, source: &Book) -> RepoResult<ArchivedBookId> {
        let fields = &source.fields;
        self.conn.execute(
            "INSERT INTO archived_books (
                original_id,
                title,
                isbn,
                summary,
                page_count,
                publisher,
                publication_year,
                copies_available
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                source.id,
                fields.title.as_str(),
                fields.isbn.as_str(),
                fields.summary.as_deref(),
                fields.page_count,
                fields.publisher.as_deref(),
                fields.publication_year,
                fields.copies_available,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_archived_book(&self, id: ArchivedBookId) -> RepoResult<Option<ArchivedBook>> {
        self.first_book_where("id = ?1", Value::Integer(id))
    }

    fn find_archived_book_by_original_id(
        &self,
        original_id: BookId,
    ) -> RepoResult<Option<ArchivedBook>> {
        self.first_book_where("original_id = ?1", Value::Integer(original_id))
    }

    fn find_archived_book_by_isbn(&self, isbn: &str) -> RepoResult<Option<ArchivedBook>> {
        self.first_book_where("isbn = ?1", Value::Text(isbn.to_string()))
    }

    fn find_archived_book_by_title(&self, title: &str) -> RepoResult<Option<ArchivedBook>> {
        self.first_book_where("title = ?1", Value::Text(title.to_string()))
    }

    fn list_archived_books(&self, query: &BookListQuery) -> RepoResult<Vec<ArchivedBook>> {
        let mut sql = format!("{ARCHIVED_BOOK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(year) = query.publication_year {
            sql.push_str(" AND publication_year = ?");
            bind_values.push(Value::Integer(i64::from(year)));
        }
        sql.push_str(" ORDER BY id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_archived_book_row(row)?);
        }
        Ok(books)
    }

    fn delete_archived_book(&self, id: ArchivedBookId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM archived_books WHERE id = ?1;", [id])?;
        ensure_changed(changed, "archived_books", id)
    }

    fn link_archived(
        &self,
        author_id: ArchivedAuthorId,
        book_id: ArchivedBookId,
    ) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO archived_author_books (
                archived_author_id,
                archived_book_id
            ) VALUES (?1, ?2);",
            params![author_id, book_id],
        )?;
        Ok(inserted == 1)
    }

    fn list_links_for_archived_author(
        &self,
        author_id: ArchivedAuthorId,
    ) -> RepoResult<Vec<ArchivedLink>> {
        self.links_where("archived_author_id = ?1", author_id)
    }

    fn list_links_for_archived_book(
        &self,
        book_id: ArchivedBookId,
    ) -> RepoResult<Vec<ArchivedLink>> {
        self.links_where("archived_book_id = ?1", book_id)
    }
}

fn parse_archived_author_row(row: &Row<'_>) -> RepoResult<ArchivedAuthor> {
    let id: ArchivedAuthorId = row.get("id")?;
    let fields = AuthorFields {
        name: row.get("name")?,
        country: row.get("country")?,
        description: row.get("description")?,
        birth_year: row.get("birth_year")?,
        death_year: row.get("death_year")?,
    };
    fields
        .validate()
        .map_err(|err| invalid_row("archived_authors", id, err))?;
    Ok(ArchivedAuthor {
        id,
        original_id: row.get("original_id")?,
        archived_at: row.get("archived_at")?,
        fields,
    })
}

fn parse_archived_book_row(row: &Row<'_>) -> RepoResult<ArchivedBook> {
    let id: ArchivedBookId = row.get("id")?;
    let fields = BookFields {
        title: row.get("title")?,
        isbn: row.get("isbn")?,
        summary: row.get("summary")?,
        page_count: row.get("page_count")?,
        publisher: row.get("publisher")?,
        publication_year: row.get("publication_year")?,
        copies_available: row.get("copies_available")?,
    };
    fields
        .validate()
        .map_err(|err| invalid_row("archived_books", id, err))?;
    Ok(ArchivedBook {
        id,
        original_id: row.get("original_id")?,
        archived_at: row.get("archived_at")?,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::{ArchiveRepository, SqliteArchiveRepository};
    use crate::db::open_db_in_memory;
    use crate::model::author::{Author, NewAuthor};
    use crate::model::book::{Book, NewBook};

    fn sample_author(id: i64, name: &str) -> Author {
        Author {
            id,
            fields: NewAuthor::new(name, "Argentina", "1899").into_fields().unwrap(),
        }
    }

    fn sample_book(id: i64, title: &str, isbn: &str) -> Book {
        Book {
            id,
            fields: NewBook::new(title, isbn).into_parts().unwrap().0,
        }
    }

    #[test]
    fn link_archived_skips_existing_pair() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteArchiveRepository::new(&conn);
        let author_id = repo.archive_author(&sample_author(7, "Jorge Luis Borges")).unwrap();
        let book_id = repo.archive_book(&sample_book(3, "Ficciones", "001")).unwrap();

        assert!(repo.link_archived(author_id, book_id).unwrap());
        assert!(!repo.link_archived(author_id, book_id).unwrap());
        assert_eq!(repo.list_links_for_archived_book(book_id).unwrap().len(), 1);
    }

    #[test]
    fn deleting_archived_author_cascades_links_but_keeps_books() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteArchiveRepository::new(&conn);
        let author_id = repo.archive_author(&sample_author(7, "Jorge Luis Borges")).unwrap();
        let book_id = repo.archive_book(&sample_book(3, "Ficciones", "001")).unwrap();
        repo.link_archived(author_id, book_id).unwrap();

        repo.delete_archived_author(author_id).unwrap();

        assert!(repo.list_links_for_archived_book(book_id).unwrap().is_empty());
        let kept = repo.get_archived_book(book_id).unwrap().unwrap();
        assert_eq!(kept.original_id, 3);
    }

    #[test]
    fn name_lookup_returns_oldest_copy() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteArchiveRepository::new(&conn);
        let first = repo.archive_author(&sample_author(1, "Jorge Luis Borges")).unwrap();
        repo.archive_author(&sample_author(2, "Jorge Luis Borges")).unwrap();

        let found = repo
            .find_archived_author_by_name("Jorge Luis Borges")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first);
        assert_eq!(found.original_id, 1);
    }
}
