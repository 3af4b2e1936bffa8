use catalog_core::db::open_db_in_memory;
use catalog_core::{AuthorService, BookService, CatalogError, NewAuthor, NewBook};
use rusqlite::Connection;

const BORGES: &str = "Jorge Luis Borges";

fn seed(conn: &Connection) {
    AuthorService::new(conn)
        .create_author(NewAuthor::new(BORGES, "Argentina", "1899").with_death_year("1986"))
        .unwrap();
}

fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn borges_ficciones_round_trip() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let books = BookService::new(&conn);
    let created = books
        .create_book(NewBook::new("Ficciones", "001").with_author(BORGES))
        .unwrap();

    let archived = books.archive_book("Ficciones").unwrap();
    assert_eq!(archived.counterparts, 1);
    assert_eq!(archived.links_created, 1);
    assert!(matches!(
        books.book_detail("Ficciones"),
        Err(CatalogError::NotFound(_))
    ));
    assert_eq!(row_count(&conn, "archived_books"), 1);
    assert_eq!(row_count(&conn, "archived_authors"), 1);
    assert_eq!(row_count(&conn, "archived_author_books"), 1);
    assert!(AuthorService::new(&conn).author_detail(BORGES).is_ok());

    let in_archive = books.find_archived_book("Ficciones").unwrap();
    assert_eq!(in_archive.book.original_id, created.book.id);
    assert_eq!(in_archive.author_names, vec![BORGES.to_string()]);

    let restored = books.restore_book("Ficciones").unwrap();
    assert_ne!(restored.restored_id, created.book.id);
    assert_eq!(restored.links_restored, 1);
    assert_eq!(restored.counterparts_created, 0);

    let detail = books.book_detail("Ficciones").unwrap();
    assert_eq!(detail.book.id, restored.restored_id);
    assert_eq!(detail.book.fields, created.book.fields);
    assert_eq!(detail.authors, created.authors);
    assert!(matches!(
        books.find_archived_book("Ficciones"),
        Err(CatalogError::NotFound(_))
    ));
    assert_eq!(row_count(&conn, "archived_authors"), 1);
}

#[test]
fn archiving_book_without_authors_fails_and_keeps_it_live() {
    let conn = open_db_in_memory().unwrap();
    let books = BookService::new(&conn);
    books.create_book(NewBook::new("Ficciones", "001")).unwrap();

    let err = books.archive_book("Ficciones").unwrap_err();

    assert!(matches!(err, CatalogError::MissingRelationship(_)));
    assert_eq!(err.status_code(), 400);
    assert!(books.book_detail("Ficciones").is_ok());
    assert_eq!(row_count(&conn, "archived_books"), 0);
}

#[test]
fn archiving_isbn_already_in_archive_is_duplicate() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let books = BookService::new(&conn);
    books
        .create_book(NewBook::new("Ficciones", "001").with_author(BORGES))
        .unwrap();
    books.archive_book("Ficciones").unwrap();
    books
        .create_book(NewBook::new("Ficciones", "001").with_author(BORGES))
        .unwrap();

    let err = books.archive_book("Ficciones").unwrap_err();

    assert!(matches!(err, CatalogError::Duplicate(_)));
    assert!(books.book_detail("Ficciones").is_ok());
    assert_eq!(row_count(&conn, "archived_books"), 1);
}

#[test]
fn archived_author_is_shared_between_archived_books() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let books = BookService::new(&conn);
    books
        .create_book(NewBook::new("Ficciones", "001").with_author(BORGES))
        .unwrap();
    books
        .create_book(NewBook::new("El Aleph", "002").with_author(BORGES))
        .unwrap();

    books.archive_book("Ficciones").unwrap();
    books.archive_book("El Aleph").unwrap();

    assert_eq!(row_count(&conn, "archived_authors"), 1);
    assert_eq!(row_count(&conn, "archived_author_books"), 2);
    let archived_author = AuthorService::new(&conn).find_archived_author(BORGES).unwrap();
    assert_eq!(
        archived_author.book_titles,
        vec!["Ficciones".to_string(), "El Aleph".to_string()]
    );
}

#[test]
fn restore_recreates_missing_author_from_archive() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let books = BookService::new(&conn);
    books
        .create_book(NewBook::new("Ficciones", "001").with_author(BORGES))
        .unwrap();
    books.archive_book("Ficciones").unwrap();
    conn.execute("DELETE FROM authors;", []).unwrap();

    let restored = books.restore_book("Ficciones").unwrap();

    assert_eq!(restored.counterparts_created, 1);
    assert_eq!(restored.links_restored, 1);
    let author = AuthorService::new(&conn).author_detail(BORGES).unwrap();
    assert_eq!(author.author.fields.death_year.as_deref(), Some("1986"));
    assert_eq!(author.book_count, 1);
}

#[test]
fn restore_fails_when_isbn_is_live_again() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let books = BookService::new(&conn);
    books
        .create_book(NewBook::new("Ficciones", "001").with_author(BORGES))
        .unwrap();
    books.archive_book("Ficciones").unwrap();
    books
        .create_book(NewBook::new("Fictions", "001").with_author(BORGES))
        .unwrap();

    let err = books.restore_book("Ficciones").unwrap_err();

    assert!(matches!(err, CatalogError::Duplicate(_)));
    assert_eq!(row_count(&conn, "books"), 1);
    assert!(books.find_archived_book("Ficciones").is_ok());
}

#[test]
fn restore_unknown_title_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let err = BookService::new(&conn).restore_book("Ficciones").unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn archived_listing_filters_by_publication_year() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let books = BookService::new(&conn);
    books
        .create_book(
            NewBook::new("Ficciones", "001")
                .with_author(BORGES)
                .with_publication_year(1944),
        )
        .unwrap();
    books
        .create_book(
            NewBook::new("El Aleph", "002")
                .with_author(BORGES)
                .with_publication_year(1949),
        )
        .unwrap();
    books.archive_book("Ficciones").unwrap();
    books.archive_book("El Aleph").unwrap();

    let from_1949 = books.list_archived_books(Some(1949)).unwrap();
    assert_eq!(from_1949.len(), 1);
    assert_eq!(from_1949[0].fields.title, "El Aleph");
    assert_eq!(books.list_archived_books(None).unwrap().len(), 2);
    assert!(matches!(
        books.list_archived_books(Some(2001)),
        Err(CatalogError::NotFound(_))
    ));
}
