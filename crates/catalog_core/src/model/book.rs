//! Live book records, author links and book request shapes.
//!
//! # Invariants
//! - `title` and `isbn` are each unique among live books.
//! - `copies_available` and `page_count` are never negative.

use crate::model::author::{Author, AuthorId, AuthorSummary};
use crate::model::deserialize_present;
use crate::model::validation::{check_non_negative, normalize_key, require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Surrogate identifier of a live book.
pub type BookId = i64;

/// Copies recorded when a create request omits the count.
pub const DEFAULT_COPIES_AVAILABLE: i64 = 1;

/// Scalar book fields shared by live and archived records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFields {
    pub title: String,
    pub isbn: String,
    pub summary: Option<String>,
    pub page_count: Option<i64>,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub copies_available: i64,
}

impl BookFields {
    /// Checks field-level rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("isbn", &self.isbn)?;
        if let Some(page_count) = self.page_count {
            check_non_negative("page_count", page_count)?;
        }
        check_non_negative("copies_available", self.copies_available)?;
        Ok(())
    }
}

/// Live catalog book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    #[serde(flatten)]
    pub fields: BookFields,
}

/// One edge of the live author/book relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorBookLink {
    pub author_id: AuthorId,
    pub book_id: BookId,
}

/// Create request for one book, linked to existing authors by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub isbn: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub page_count: Option<i64>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    /// Falls back to [`DEFAULT_COPIES_AVAILABLE`].
    #[serde(default)]
    pub copies_available: Option<i64>,
    #[serde(default)]
    pub author_names: Vec<String>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, isbn: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            isbn: isbn.into(),
            summary: None,
            page_count: None,
            publisher: None,
            publication_year: None,
            copies_available: None,
            author_names: Vec::new(),
        }
    }

    pub fn with_author(mut self, name: impl Into<String>) -> Self {
        self.author_names.push(name.into());
        self
    }

    pub fn with_publication_year(mut self, year: i32) -> Self {
        self.publication_year = Some(year);
        self
    }

    /// Splits the request into storable fields and normalized author names.
    ///
    /// Author names are deduplicated, keeping first-seen order.
    pub fn into_parts(self) -> Result<(BookFields, Vec<String>), ValidationError> {
        let fields = BookFields {
            title: normalize_key(&self.title),
            isbn: normalize_key(&self.isbn),
            summary: self.summary,
            page_count: self.page_count,
            publisher: self.publisher.map(|value| value.trim().to_string()),
            publication_year: self.publication_year,
            copies_available: self.copies_available.unwrap_or(DEFAULT_COPIES_AVAILABLE),
        };
        fields.validate()?;

        let mut author_names: Vec<String> = Vec::with_capacity(self.author_names.len());
        for name in &self.author_names {
            require_text("author_names", name)?;
            let normalized = normalize_key(name);
            if !author_names.contains(&normalized) {
                author_names.push(normalized);
            }
        }
        Ok((fields, author_names))
    }
}

/// Partial update for one book. Same presence rules as
/// [`AuthorPatch`](crate::model::author::AuthorPatch).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_count: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub publisher: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub publication_year: Option<Option<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copies_available: Option<i64>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.page_count.is_none()
            && self.publisher.is_none()
            && self.publication_year.is_none()
            && self.copies_available.is_none()
    }

    pub fn apply_to(&self, fields: &mut BookFields) {
        if let Some(summary) = self.summary.as_ref() {
            fields.summary = summary.clone();
        }
        if let Some(page_count) = self.page_count {
            fields.page_count = page_count;
        }
        if let Some(publisher) = self.publisher.as_ref() {
            fields.publisher = publisher.as_ref().map(|value| value.trim().to_string());
        }
        if let Some(publication_year) = self.publication_year {
            fields.publication_year = publication_year;
        }
        if let Some(copies_available) = self.copies_available {
            fields.copies_available = copies_available;
        }
    }
}

/// Short book view embedded in author details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub title: String,
    pub isbn: String,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            title: book.fields.title.clone(),
            isbn: book.fields.isbn.clone(),
        }
    }
}

/// Filter for book listings, live or archived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookListQuery {
    pub publication_year: Option<i32>,
}

/// Author view: one author with the books linked to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorDetail {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<BookSummary>,
    pub book_count: usize,
}

/// Book view: one book with the authors linked to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub authors: Vec<AuthorSummary>,
}
