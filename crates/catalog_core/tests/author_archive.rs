use catalog_core::db::open_db_in_memory;
use catalog_core::{AuthorService, BookService, CatalogError, NewAuthor, NewBook};
use rusqlite::Connection;

const BORGES: &str = "Jorge Luis Borges";

fn seed_borges(conn: &Connection, titles: &[(&str, &str)]) -> i64 {
    let author = AuthorService::new(conn)
        .create_author(
            NewAuthor::new(BORGES, "Argentina", "1899")
                .with_description("Argentine writer of short stories and essays")
                .with_death_year("1986"),
        )
        .unwrap();
    let books = BookService::new(conn);
    for (title, isbn) in titles {
        books
            .create_book(NewBook::new(*title, *isbn).with_author(BORGES))
            .unwrap();
    }
    author.id
}

fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn archive_then_restore_preserves_fields_with_new_id() {
    let conn = open_db_in_memory().unwrap();
    let original_id = seed_borges(&conn, &[("Ficciones", "001")]);
    let service = AuthorService::new(&conn);
    let before = service.author_detail(BORGES).unwrap();

    let archived = service.archive_author(BORGES).unwrap();
    assert!(!archived.merged);
    assert_eq!(archived.counterparts, 1);
    assert_eq!(archived.links_created, 1);
    assert!(matches!(
        service.author_detail(BORGES),
        Err(CatalogError::NotFound(_))
    ));
    assert_eq!(row_count(&conn, "books"), 1);
    assert_eq!(row_count(&conn, "author_books"), 0);

    let in_archive = service.find_archived_author(BORGES).unwrap();
    assert_eq!(in_archive.author.original_id, original_id);
    assert_eq!(in_archive.author.fields, before.author.fields);
    assert_eq!(in_archive.book_titles, vec!["Ficciones".to_string()]);

    let restored = service.restore_author(BORGES).unwrap();
    assert_ne!(restored.restored_id, original_id);
    assert_eq!(restored.links_restored, 1);
    assert_eq!(restored.counterparts_created, 0);

    let after = service.author_detail(BORGES).unwrap();
    assert_eq!(after.author.id, restored.restored_id);
    assert_eq!(after.author.fields, before.author.fields);
    assert_eq!(after.books, before.books);
    assert!(matches!(
        service.find_archived_author(BORGES),
        Err(CatalogError::NotFound(_))
    ));
    assert_eq!(row_count(&conn, "archived_author_books"), 0);
    assert_eq!(row_count(&conn, "archived_books"), 1);
}

#[test]
fn archiving_author_with_books_copies_each_book_once() {
    let conn = open_db_in_memory().unwrap();
    seed_borges(
        &conn,
        &[("Ficciones", "001"), ("El Aleph", "002"), ("Labyrinths", "003")],
    );

    let outcome = AuthorService::new(&conn).archive_author(BORGES).unwrap();

    assert_eq!(outcome.counterparts, 3);
    assert_eq!(outcome.links_created, 3);
    assert_eq!(row_count(&conn, "archived_authors"), 1);
    assert_eq!(row_count(&conn, "archived_books"), 3);
    assert_eq!(row_count(&conn, "archived_author_books"), 3);
    assert_eq!(row_count(&conn, "books"), 3);
}

#[test]
fn merge_branch_reuses_archived_author_and_keeps_live_one() {
    let conn = open_db_in_memory().unwrap();
    seed_borges(&conn, &[("Ficciones", "001"), ("El Aleph", "002")]);
    let authors = AuthorService::new(&conn);
    let books = BookService::new(&conn);
    let first = authors.archive_author(BORGES).unwrap();

    let live = authors
        .create_author(NewAuthor::new(BORGES, "Argentina", "1899"))
        .unwrap();
    conn.execute(
        "INSERT INTO author_books (author_id, book_id)
         SELECT ?1, id FROM books WHERE title = 'Ficciones';",
        [live.id],
    )
    .unwrap();
    books
        .create_book(NewBook::new("Historia universal de la infamia", "004").with_author(BORGES))
        .unwrap();

    let merged = authors.archive_author(BORGES).unwrap();

    assert!(merged.merged);
    assert_eq!(merged.archived_id, first.archived_id);
    assert_eq!(merged.counterparts, 2);
    assert_eq!(merged.links_created, 1);
    assert_eq!(row_count(&conn, "archived_authors"), 1);
    assert_eq!(row_count(&conn, "archived_books"), 3);
    assert_eq!(row_count(&conn, "archived_author_books"), 3);
    assert_eq!(authors.author_detail(BORGES).unwrap().author.id, live.id);
}

#[test]
fn merge_branch_without_live_author_fails_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    seed_borges(&conn, &[("Ficciones", "001")]);
    let service = AuthorService::new(&conn);
    service.archive_author(BORGES).unwrap();

    let err = service.archive_author(BORGES).unwrap_err();

    assert!(matches!(err, CatalogError::NotFound(_)));
    assert_eq!(row_count(&conn, "archived_authors"), 1);
    assert_eq!(row_count(&conn, "archived_books"), 1);
    assert_eq!(row_count(&conn, "archived_author_books"), 1);
}

#[test]
fn restore_recreates_missing_books_with_fresh_ids() {
    let conn = open_db_in_memory().unwrap();
    seed_borges(&conn, &[("Ficciones", "001"), ("El Aleph", "002")]);
    let service = AuthorService::new(&conn);
    let old_ids: Vec<i64> = BookService::new(&conn)
        .list_books(None)
        .unwrap()
        .iter()
        .map(|book| book.id)
        .collect();
    service.archive_author(BORGES).unwrap();
    conn.execute("DELETE FROM books;", []).unwrap();

    let restored = service.restore_author(BORGES).unwrap();

    assert_eq!(restored.links_restored, 2);
    assert_eq!(restored.counterparts_created, 2);
    let live_books = BookService::new(&conn).list_books(None).unwrap();
    assert_eq!(live_books.len(), 2);
    for book in &live_books {
        assert!(!old_ids.contains(&book.id), "book id {} was reused", book.id);
    }
    assert_eq!(service.author_detail(BORGES).unwrap().book_count, 2);
}

#[test]
fn restore_fails_when_live_author_has_the_name() {
    let conn = open_db_in_memory().unwrap();
    seed_borges(&conn, &[("Ficciones", "001")]);
    let service = AuthorService::new(&conn);
    service.archive_author(BORGES).unwrap();
    service
        .create_author(NewAuthor::new(BORGES, "Argentina", "1899"))
        .unwrap();

    let err = service.restore_author(BORGES).unwrap_err();

    assert!(matches!(err, CatalogError::Duplicate(_)));
    assert!(service.find_archived_author(BORGES).is_ok());
}

#[test]
fn failed_restore_leaves_no_partial_rows() {
    let conn = open_db_in_memory().unwrap();
    seed_borges(&conn, &[("Ficciones", "001"), ("El Aleph", "002")]);
    let service = AuthorService::new(&conn);
    service.archive_author(BORGES).unwrap();
    conn.execute("DELETE FROM books WHERE title = 'El Aleph';", [])
        .unwrap();
    BookService::new(&conn)
        .create_book(NewBook::new("El Aleph", "999"))
        .unwrap();

    let err = service.restore_author(BORGES).unwrap_err();

    assert!(matches!(err, CatalogError::Duplicate(ref message) if message.contains("El Aleph")));
    assert_eq!(row_count(&conn, "authors"), 0);
    assert_eq!(row_count(&conn, "author_books"), 0);
    assert_eq!(row_count(&conn, "books"), 2);
    assert_eq!(service.find_archived_author(BORGES).unwrap().book_titles.len(), 2);
}

#[test]
fn archived_listing_filters_by_country() {
    let conn = open_db_in_memory().unwrap();
    seed_borges(&conn, &[("Ficciones", "001")]);
    let service = AuthorService::new(&conn);
    service
        .create_author(NewAuthor::new("Italo Calvino", "Italy", "1923"))
        .unwrap();
    service.archive_author(BORGES).unwrap();
    service.archive_author("Italo Calvino").unwrap();

    let argentines = service.list_archived_authors(Some("Argentina")).unwrap();
    assert_eq!(argentines.len(), 1);
    assert_eq!(argentines[0].fields.name, BORGES);
    assert_eq!(service.list_archived_authors(None).unwrap().len(), 2);
    assert!(matches!(
        service.list_archived_authors(Some("Peru")),
        Err(CatalogError::NotFound(_))
    ));
}
