//! Integration tests for the promptdb binary.

use std::{fs, path::Path};

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::prelude::*;
use rusqlite::Connection;
use tempfile::TempDir;

/// Command isolated from the caller's config files and environment.
fn cmd(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("promptdb");
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .env_remove("PROMPTDB_DATABASE")
        .env_remove("PROMPTDB_LOG")
        .env_remove("LLM_API_KEY")
        .env_remove("LLM_PROVIDER")
        .env_remove("LLM_MODEL")
        .env_remove("OLLAMA_URL");
    cmd
}

fn shop_db(dir: &TempDir) -> String {
    let path = dir.path().join("shop.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
             CREATE TABLE orders (id INTEGER PRIMARY KEY, total REAL);"
        )
        .unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_check_read_only() {
    let home = TempDir::new().unwrap();
    cmd(home.path())
        .args(["--no-color", "check", "select * from users"])
        .assert()
        .success()
        .stdout(predicate::str::contains("read-only"));
}

#[test]
fn test_check_rejects_write() {
    let home = TempDir::new().unwrap();
    cmd(home.path())
        .args(["--no-color", "check", "/* tidy */ DROP TABLE users"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("rejected"));
}

#[test]
fn test_check_from_stdin() {
    let home = TempDir::new().unwrap();
    cmd(home.path())
        .args(["--no-color", "check", "-"])
        .write_stdin("-- report\nSELECT 1\n")
        .assert()
        .success();
}

#[test]
fn test_check_json_output() {
    let home = TempDir::new().unwrap();
    cmd(home.path())
        .args(["check", "-f", "json", "DELETE FROM t"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"verdict\": \"not_select\""));
}

#[test]
fn test_schema_from_database() {
    let home = TempDir::new().unwrap();
    let db = shop_db(&home);
    cmd(home.path())
        .args(["--no-color", "-d", db.as_str(), "schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Table: orders, Columns: id (INTEGER), total (REAL)\nTable: users, Columns: id (INTEGER), name (TEXT)"
        ));
}

#[test]
fn test_schema_from_database_env() {
    let home = TempDir::new().unwrap();
    let db = shop_db(&home);
    cmd(home.path())
        .env("PROMPTDB_DATABASE", &db)
        .args(["schema", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"users\""));
}

#[test]
fn test_schema_from_ddl() {
    let home = TempDir::new().unwrap();
    let ddl = home.path().join("schema.sql");
    fs::write(&ddl, "CREATE TABLE items (sku TEXT, price REAL);").unwrap();
    cmd(home.path())
        .args(["--no-color", "schema", "--ddl", ddl.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Table: items, Columns: sku (TEXT), price (REAL)"));
}

#[test]
fn test_schema_database_from_config_file() {
    let home = TempDir::new().unwrap();
    let db = shop_db(&home);
    fs::write(
        home.path().join(".promptdb.toml"),
        format!("[database]\npath = {:?}\n", db)
    )
    .unwrap();
    cmd(home.path())
        .args(["--no-color", "schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Table: users"));
}

#[test]
fn test_schema_without_database_fails() {
    let home = TempDir::new().unwrap();
    cmd(home.path())
        .args(["schema"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_missing_database_file_fails() {
    let home = TempDir::new().unwrap();
    cmd(home.path())
        .args(["-d", "/nonexistent/dir/shop.db", "schema"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_ask_dry_run_prints_prompt() {
    let home = TempDir::new().unwrap();
    let db = shop_db(&home);
    cmd(home.path())
        .args(["--no-color", "-d", db.as_str(), "ask", "--dry-run", "how", "many", "users"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN"))
        .stdout(predicate::str::contains("Table: users, Columns: id (INTEGER), name (TEXT)"))
        .stdout(predicate::str::contains("User query: how many users"));
}

#[test]
fn test_ask_without_api_key_fails() {
    let home = TempDir::new().unwrap();
    let db = shop_db(&home);
    cmd(home.path())
        .args(["--no-color", "-d", db.as_str(), "--provider", "open-ai", "ask", "anything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_ask_with_ddl_is_rejected() {
    let home = TempDir::new().unwrap();
    let db = shop_db(&home);
    let ddl = home.path().join("schema.sql");
    fs::write(&ddl, "CREATE TABLE t (a INT);").unwrap();
    cmd(home.path())
        .args(["-d", db.as_str(), "--ddl", ddl.to_str().unwrap(), "ask", "anything"])
        .assert()
        .failure();
}

#[test]
fn test_ask_unreachable_model_fails() {
    let home = TempDir::new().unwrap();
    let db = shop_db(&home);
    fs::write(home.path().join(".promptdb.toml"), "[retry]\nmax_retries = 0\n").unwrap();
    cmd(home.path())
        .args([
            "--no-color",
            "-d",
            db.as_str(),
            "--provider",
            "ollama",
            "--ollama-url",
            "http://127.0.0.1:9",
            "ask",
            "anything"
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_invalid_log_level_fails() {
    let home = TempDir::new().unwrap();
    cmd(home.path())
        .args(["--log-level", "promptdb=loud", "check", "SELECT 1"])
        .assert()
        .failure();
}
