//! Live book repository, including the live author/book link table.
//!
//! # Invariants
//! - Write paths call `BookFields::validate()` before SQL mutations.
//! - Deleting a book removes its live links through `ON DELETE CASCADE`.

use crate::model::author::Author;
use crate::model::book::{AuthorBookLink, Book, BookFields, BookId, BookListQuery};
use crate::repo::author_repo::parse_author_row;
use crate::repo::{ensure_changed, invalid_row, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    isbn,
    summary,
    page_count,
    publisher,
    publication_year,
    copies_available
FROM books";

/// Repository interface for live books and their author links.
pub trait BookRepository {
    /// Inserts one book and returns its fresh id.
    fn create_book(&self, fields: &BookFields) -> RepoResult<BookId>;
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn find_book_by_title(&self, title: &str) -> RepoResult<Option<Book>>;
    fn find_book_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>>;
    /// Lists books ordered by id.
    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>>;
    /// Overwrites every scalar field of an existing book.
    fn update_book(&self, book: &Book) -> RepoResult<()>;
    fn delete_book(&self, id: BookId) -> RepoResult<()>;
    /// Authors linked to one book, ordered by author id.
    fn list_authors_for_book(&self, id: BookId) -> RepoResult<Vec<Author>>;
    /// Inserts one live link. Returns `false` when the pair already existed.
    fn create_link(&self, link: &AuthorBookLink) -> RepoResult<bool>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn find_one(&self, column: &'static str, value: &str) -> RepoResult<Option<Book>> {
        self.conn
            .query_row(
                &format!("{BOOK_SELECT_SQL} WHERE {column} = ?1;"),
                [value],
                |row| Ok(parse_book_row(row)),
            )
            .optional()?
            .transpose()
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, fields: &BookFields) -> RepoResult<BookId> {
        fields
            .validate()
            .map_err(|err| RepoError::InvalidData(err.to_string()))?;

        self.conn.execute(
            "INSERT INTO books (
                title,
                isbn,
                summary,
                page_count,
                publisher,
                publication_year,
                copies_available
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
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

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.conn
            .query_row(
                &format!("{BOOK_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_book_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn find_book_by_title(&self, title: &str) -> RepoResult<Option<Book>> {
        self.find_one("title", title)
    }

    fn find_book_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>> {
        self.find_one("isbn", isbn)
    }

    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>> {
        let mut sql = format!("{BOOK_SELECT_SQL} WHERE 1 = 1");
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
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }

    fn update_book(&self, book: &Book) -> RepoResult<()> {
        book.fields
            .validate()
            .map_err(|err| invalid_row("books", book.id, err))?;

        let changed = self.conn.execute(
            "UPDATE books
             SET
                title = ?2,
                isbn = ?3,
                summary = ?4,
                page_count = ?5,
                publisher = ?6,
                publication_year = ?7,
                copies_available = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                book.id,
                book.fields.title.as_str(),
                book.fields.isbn.as_str(),
                book.fields.summary.as_deref(),
                book.fields.page_count,
                book.fields.publisher.as_deref(),
                book.fields.publication_year,
                book.fields.copies_available,
            ],
        )?;
        ensure_changed(changed, "books", book.id)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM books WHERE id = ?1;", [id])?;
        ensure_changed(changed, "books", id)
    }

    fn list_authors_for_book(&self, id: BookId) -> RepoResult<Vec<Author>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                a.id AS id,
                a.name AS name,
                a.country AS country,
                a.description AS description,
                a.birth_year AS birth_year,
                a.death_year AS death_year
             FROM authors a
             INNER JOIN author_books ab ON ab.author_id = a.id
             WHERE ab.book_id = ?1
             ORDER BY a.id ASC;",
        )?;
        let mut rows = stmt.query([id])?;
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(parse_author_row(row)?);
        }
        Ok(authors)
    }

    fn create_link(&self, link: &AuthorBookLink) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO author_books (author_id, book_id) VALUES (?1, ?2);",
            params![link.author_id, link.book_id],
        )?;
        Ok(inserted == 1)
    }
}

/// Builds a book from a row exposing the `BOOK_SELECT_SQL` columns.
pub(crate) fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let id: BookId = row.get("id")?;
    let fields = BookFields {
        title: row.get("title")?,
        isbn: row.get("isbn")?,
        summary: row.get("summary")?,
        page_count: row.get("page_count")?,
        publisher: row.get("publisher")?,
        publication_year: row.get("publication_year")?,
        copies_available: row.get("copies_available")?,
    };
    fields.validate().map_err(|err| invalid_row("books", id, err))?;
    Ok(Book { id, fields })
}
