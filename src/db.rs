//! SQLite access: schema discovery and statement execution.
//!
//! [`Database`] is the data-source collaborator of the session. It knows
//! nothing about read-only checks; callers must run [`crate::guard`] before
//! handing it a statement.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, types::ValueRef};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{AppResult, database_error},
    schema::{Column, Schema}
};

const TABLES_QUERY: &str = "SELECT name FROM sqlite_master \
                            WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' \
                            ORDER BY name";

const COLUMNS_QUERY: &str = "SELECT name, type FROM pragma_table_info(?1) ORDER BY cid";

/// Rows returned by a statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows:    Vec<Vec<Value>>
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Connection to a SQLite database.
pub struct Database {
    conn: Connection
}

impl Database {
    /// Open an existing database file.
    ///
    /// The file is never created: a typo in the path is an error rather than
    /// an empty database.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(database_error)?;
        debug!(path = %path.display(), "Opened database");
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Read every user table and its columns.
    ///
    /// All reads happen inside one transaction so the result reflects a
    /// single snapshot of the database.
    pub fn fetch_schema(&self) -> AppResult<Schema> {
        let tx = self.conn.unchecked_transaction().map_err(database_error)?;
        let tables = {
            let mut stmt = tx.prepare(TABLES_QUERY).map_err(database_error)?;
            stmt.query_map([], |row| row.get::<_, String>(0))
                .map_err(database_error)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(database_error)?
        };

        let mut stmt = tx.prepare(COLUMNS_QUERY).map_err(database_error)?;
        let mut schema = Schema::new();
        for table in tables {
            let columns = stmt
                .query_map([&table], |row| {
                    Ok(Column::new(
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?
                    ))
                })
                .map_err(database_error)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(database_error)?;
            debug!(table = %table, columns = columns.len(), "Described table");
            schema.insert_table(table, columns);
        }
        Ok(schema)
    }

    /// Run one statement and collect every row.
    pub fn execute(&self, sql: &str) -> AppResult<ResultSet> {
        let mut stmt = self.conn.prepare(sql).map_err(database_error)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([]).map_err(database_error)?;
        while let Some(row) = cursor.next().map_err(database_error)? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(to_json(row.get_ref(idx).map_err(database_error)?));
            }
            rows.push(values);
        }
        debug!(rows = rows.len(), "Statement executed");
        Ok(ResultSet { columns, rows })
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(format!("<blob {} bytes>", bytes.len()))
    }
}
