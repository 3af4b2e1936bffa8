use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn catalog(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("catalog").unwrap();
    cmd.env_remove("CATALOG_LOG_DIR")
        .env_remove("CATALOG_LOG_LEVEL")
        .env("CATALOG_DB_PATH", db);
    cmd
}

fn seed_borges(db: &Path) {
    catalog(db)
        .args([
            "author",
            "create",
            "Jorge Luis Borges",
            "--country",
            "Argentina",
            "--birth-year",
            "1899",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Jorge Luis Borges\""));
}

#[test]
fn version_prints_both_versions() {
    let dir = tempfile::tempdir().unwrap();
    catalog(&dir.path().join("catalog.sqlite3"))
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"core\""));
}

#[test]
fn book_archive_and_restore_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("catalog.sqlite3");
    seed_borges(&db);

    catalog(&db)
        .args(["book", "create", "Ficciones", "--isbn", "001", "--author", "Jorge Luis Borges"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"isbn\": \"001\""));

    catalog(&db)
        .args(["book", "archive", "Ficciones"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"links_created\": 1"));

    catalog(&db)
        .args(["book", "show", "Ficciones"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"status\":404"));

    catalog(&db)
        .args(["book", "find-archived", "Ficciones"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jorge Luis Borges"));

    catalog(&db)
        .args(["book", "restore", "Ficciones"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"links_restored\": 1"));

    catalog(&db)
        .args(["author", "show", "Jorge Luis Borges"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"book_count\": 1"));
}

#[test]
fn duplicate_author_reports_status_400() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("catalog.sqlite3");
    seed_borges(&db);

    catalog(&db)
        .args([
            "author",
            "create",
            "Jorge Luis Borges",
            "--country",
            "Argentina",
            "--birth-year",
            "1899",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"status\":400"));
}

#[test]
fn archiving_book_without_authors_reports_missing_relationship() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("catalog.sqlite3");

    catalog(&db)
        .args(["book", "create", "Ficciones", "--isbn", "001"])
        .assert()
        .success();

    catalog(&db)
        .args(["book", "archive", "Ficciones"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"status\":400"))
        .stderr(predicate::str::contains("no authors"));
}

#[test]
fn update_clears_death_year() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("catalog.sqlite3");
    seed_borges(&db);

    catalog(&db)
        .args(["author", "update", "Jorge Luis Borges", "--death-year", "1986"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"death_year\": \"1986\""));

    catalog(&db)
        .args(["author", "update", "Jorge Luis Borges", "--clear-death-year"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"death_year\": null"));
}

#[test]
fn empty_listing_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    catalog(&dir.path().join("catalog.sqlite3"))
        .args(["author", "list", "--country", "Peru"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"status\":404"));
}

#[test]
fn log_dir_receives_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("catalog.sqlite3");
    let logs = dir.path().join("logs");

    catalog(&db)
        .args(["--log-dir"])
        .arg(&logs)
        .args(["--log-level", "info", "author", "list"])
        .assert()
        .failure();

    let entries: Vec<_> = std::fs::read_dir(&logs).unwrap().collect();
    assert!(!entries.is_empty());
}
