//! Live author repository.
//!
//! # Invariants
//! - Write paths call `AuthorFields::validate()` before SQL mutations.
//! - Deleting an author removes its live links through `ON DELETE CASCADE`.

use crate::model::author::{Author, AuthorFields, AuthorId, AuthorListQuery};
use crate::model::book::Book;
use crate::repo::book_repo::parse_book_row;
use crate::repo::{ensure_changed, invalid_row, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const AUTHOR_SELECT_SQL: &str = "SELECT
    id,
    name,
    country,
    description,
    birth_year,
    death_year
FROM authors";

/// Repository interface for live authors.
pub trait AuthorRepository {
    /// Inserts one author and returns its fresh id.
    fn create_author(&self, fields: &AuthorFields) -> RepoResult<AuthorId>;
    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    /// Exact match on the normalized name.
    fn find_author_by_name(&self, name: &str) -> RepoResult<Option<Author>>;
    /// Lists authors ordered by id.
    fn list_authors(&self, query: &AuthorListQuery) -> RepoResult<Vec<Author>>;
    /// Overwrites every scalar field of an existing author.
    fn update_author(&self, author: &Author) -> RepoResult<()>;
    fn delete_author(&self, id: AuthorId) -> RepoResult<()>;
    /// Books linked to one author, ordered by book id.
    fn list_books_for_author(&self, id: AuthorId) -> RepoResult<Vec<Book>>;
}

/// SQLite-backed author repository.
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn create_author(&self, fields: &AuthorFields) -> RepoResult<AuthorId> {
        fields
            .validate()
            .map_err(|err| RepoError::InvalidData(err.to_string()))?;

        self.conn.execute(
            "INSERT INTO authors (
                name,
                country,
                description,
                birth_year,
                death_year
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                fields.name.as_str(),
                fields.country.as_str(),
                fields.description.as_str(),
                fields.birth_year.as_str(),
                fields.death_year.as_deref(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        // Row parse errors travel as the closure's value and are flattened
        // by `transpose`.
        self.conn
            .query_row(
                &format!("{AUTHOR_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_author_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn find_author_by_name(&self, name: &str) -> RepoResult<Option<Author>> {
        self.conn
            .query_row(
                &format!("{AUTHOR_SELECT_SQL} WHERE name = ?1;"),
                [name],
                |row| Ok(parse_author_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_authors(&self, query: &AuthorListQuery) -> RepoResult<Vec<Author>> {
        let mut sql = format!("{AUTHOR_SELECT_SQL} WHERE 1 = 1");
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
            authors.push(parse_author_row(row)?);
        }
        Ok(authors)
    }

    fn update_author(&self, author: &Author) -> RepoResult<()> {
        author
            .fields
            .validate()
            .map_err(|err| invalid_row("authors", author.id, err))?;

        let changed = self.conn.execute(
            "UPDATE authors
             SET
                name = ?2,
                country = ?3,
                description = ?4,
                birth_year = ?5,
                death_year = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                author.id,
                author.fields.name.as_str(),
                author.fields.country.as_str(),
                author.fields.description.as_str(),
                author.fields.birth_year.as_str(),
                author.fields.death_year.as_deref(),
            ],
        )?;
        ensure_changed(changed, "authors", author.id)
    }

    fn delete_author(&self, id: AuthorId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM authors WHERE id = ?1;", [id])?;
        ensure_changed(changed, "authors", id)
    }

    fn list_books_for_author(&self, id: AuthorId) -> RepoResult<Vec<Book>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                b.id AS id,
                b.title AS title,
                b.isbn AS isbn,
                b.summary AS summary,
                b.page_count AS page_count,
                b.publisher AS publisher,
                b.publication_year AS publication_year,
                b.copies_available AS copies_available
             FROM books b
             INNER JOIN author_books ab ON ab.book_id = b.id
             WHERE ab.author_id = ?1
             ORDER BY b.id ASC;",
        )?;
        let mut rows = stmt.query([id])?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }
}

/// Builds an author from a row exposing the `AUTHOR_SELECT_SQL` columns.
pub(crate) fn parse_author_row(row: &Row<'_>) -> RepoResult<Author> {
    let id: AuthorId = row.get("id")?;
    let fields = AuthorFields {
        name: row.get("name")?,
        country: row.get("country")?,
        description: row.get("description")?,
        birth_year: row.get("birth_year")?,
        death_year: row.get("death_year")?,
    };
    fields
        .validate()
        .map_err(|err| invalid_row("authors", id, err))?;
    Ok(Author { id, fields })
}
