// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use promptdb::{
    db::Database,
    schema::Column
};
use rusqlite::Connection;
use serde_json::Value;
use tempfile::TempDir;

fn memory_db(setup: &str) -> Database {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(setup).unwrap();
    Database::from_connection(conn)
}

const SHOP: &str = r#"
    CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT);
    CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER, total REAL);
    INSERT INTO users VALUES (1, 'Ada', 'ada@example.com');
    INSERT INTO users VALUES (2, 'Linus', NULL);
    INSERT INTO orders VALUES (10, 1, 12.5);
"#;

#[test]
fn test_fetch_schema_lists_tables_sorted() {
    let db = memory_db(SHOP);
    let schema = db.fetch_schema().unwrap();
    let names: Vec<&str> = schema.tables().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["orders", "users"]);
}

#[test]
fn test_fetch_schema_columns_in_declaration_order() {
    let db = memory_db(SHOP);
    let schema = db.fetch_schema().unwrap();
    assert_eq!(
        schema.columns("users").unwrap(),
        &[
            Column::new("id", "INTEGER"),
            Column::new("name", "TEXT"),
            Column::new("email", "TEXT")
        ]
    );
}

#[test]
fn test_fetch_schema_empty_database() {
    let db = memory_db("");
    assert!(db.fetch_schema().unwrap().is_empty());
}

#[test]
fn test_fetch_schema_skips_internal_tables() {
    let db = memory_db("CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT, v TEXT);");
    let schema = db.fetch_schema().unwrap();
    // AUTOINCREMENT creates sqlite_sequence
    assert_eq!(schema.len(), 1);
    assert!(schema.columns("t").is_some());
}

#[test]
fn test_fetch_schema_includes_views() {
    let db = memory_db(&format!(
        "{}\nCREATE VIEW big_orders AS SELECT id, total FROM orders WHERE total > 10;",
        SHOP
    ));
    let schema = db.fetch_schema().unwrap();
    let names: Vec<&str> = schema.tables().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["big_orders", "orders", "users"]);
    let columns: Vec<&str> = schema
        .columns("big_orders")
        .unwrap()
        .iter()
        .map(|column| column.name.as_str())
        .collect();
    assert_eq!(columns, vec!["id", "total"]);
}

#[test]
fn test_fetch_schema_quoted_table_name() {
    let db = memory_db(r#"CREATE TABLE "odd ""name""" (a INT);"#);
    let schema = db.fetch_schema().unwrap();
    assert_eq!(schema.columns("odd \"name\"").unwrap().len(), 1);
}

#[test]
fn test_fetch_schema_untyped_column() {
    let db = memory_db("CREATE TABLE loose (anything);");
    let schema = db.fetch_schema().unwrap();
    assert_eq!(schema.columns("loose").unwrap()[0], Column::new("anything", ""));
}

#[test]
fn test_execute_select() {
    let db = memory_db(SHOP);
    let results = db.execute("SELECT id, name, email FROM users ORDER BY id").unwrap();
    assert_eq!(results.columns, vec!["id", "name", "email"]);
    assert_eq!(results.rows.len(), 2);
    assert_eq!(results.rows[0][1], Value::from("Ada"));
    assert_eq!(results.rows[1][2], Value::Null);
}

#[test]
fn test_execute_real_values() {
    let db = memory_db(SHOP);
    let results = db.execute("SELECT total FROM orders").unwrap();
    assert_eq!(results.rows[0][0], Value::from(12.5));
}

#[test]
fn test_execute_no_rows() {
    let db = memory_db(SHOP);
    let results = db.execute("SELECT * FROM users WHERE id = 99").unwrap();
    assert!(results.is_empty());
    assert_eq!(results.columns.len(), 3);
}

#[test]
fn test_execute_unknown_table_is_error() {
    let db = memory_db(SHOP);
    assert!(db.execute("SELECT * FROM nope").is_err());
}

#[test]
fn test_open_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.db");
    assert!(Database::open(&path).is_err());
    assert!(!path.exists());
}

#[test]
fn test_open_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shop.db");
    Connection::open(&path).unwrap().execute_batch(SHOP).unwrap();

    let db = Database::open(&path).unwrap();
    assert_eq!(db.fetch_schema().unwrap().len(), 2);
}
