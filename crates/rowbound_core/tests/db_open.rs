use rowbound_core::db::{open_db, open_db_in_memory};
use rusqlite::Connection;

#[test]
fn in_memory_connection_enables_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(pragma(&conn, "foreign_keys"), 1);
}

#[test]
fn opening_same_file_twice_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rowbound.db");

    let first = open_db(&path).unwrap();
    first
        .execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY); INSERT INTO t DEFAULT VALUES;")
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    let rows: i64 = second
        .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(pragma(&second, "foreign_keys"), 1);
}

#[test]
fn opening_path_in_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("rowbound.db");

    assert!(open_db(&path).is_err());
}

fn pragma(conn: &Connection, name: &str) -> i64 {
    conn.query_row(&format!("PRAGMA {name};"), [], |row| row.get(0))
        .unwrap()
}
