//! Database schema representation used to ground generated SQL.
//!
//! A [`Schema`] maps table names to their ordered `(column, type)` pairs. Table
//! order is preserved as the source reported it, so the prompt lists tables
//! the same way the database does.
//!
//! # Example
//!
//! ```
//! use promptdb::schema::{Schema, SqlDialect};
//!
//! let sql = r#"
//!     CREATE TABLE users (
//!         id INT PRIMARY KEY,
//!         email VARCHAR(255) NOT NULL
//!     );
//! "#;
//!
//! let schema = Schema::from_ddl(sql, SqlDialect::Generic).unwrap();
//! assert_eq!(schema.columns("users").unwrap().len(), 2);
//! assert_eq!(
//!     schema.to_prompt(),
//!     "Table: users, Columns: id (INT), email (VARCHAR(255))"
//! );
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use sqlparser::{
    ast::Statement,
    dialect::{Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect},
    parser::Parser
};

use crate::error::{AppResult, schema_parse_error};

/// SQL dialect for parsing DDL files
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub enum SqlDialect {
    #[default]
    Generic,
    MySQL,
    PostgreSQL,
    SQLite
}

impl SqlDialect {
    /// Convert to sqlparser dialect for parsing
    pub fn into_parser_dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::MySQL => Box::new(MySqlDialect {}),
            Self::PostgreSQL => Box::new(PostgreSqlDialect {}),
            Self::SQLite => Box::new(SQLiteDialect {})
        }
    }
}

/// Column name and declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name:      String,
    /// Declared SQL type as reported by the source; may be empty in SQLite
    pub data_type: String
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name:      name.into(),
            data_type: data_type.into()
        }
    }
}

/// Mapping from table name to its ordered columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Schema {
    tables: IndexMap<String, Vec<Column>>
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, replacing any previous definition with the same name.
    pub fn insert_table(&mut self, name: impl Into<String>, columns: Vec<Column>) {
        self.tables.insert(name.into(), columns);
    }

    /// Tables in source order
    pub fn tables(&self) -> impl Iterator<Item = (&str, &[Column])> {
        self.tables
            .iter()
            .map(|(name, columns)| (name.as_str(), columns.as_slice()))
    }

    pub fn columns(&self, table: &str) -> Option<&[Column]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Render the schema for inclusion in a prompt.
    ///
    /// One line per table: `Table: T, Columns: c1 (t1), c2 (t2)`.
    pub fn to_prompt(&self) -> String {
        self.tables
            .iter()
            .map(|(table, columns)| {
                let columns = columns
                    .iter()
                    .map(|c| format!("{} ({})", c.name, c.data_type))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Table: {}, Columns: {}", table, columns)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build a schema from `CREATE TABLE` statements.
    ///
    /// Statements other than `CREATE TABLE` are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if SQL parsing fails
    pub fn from_ddl(sql: &str, dialect: SqlDialect) -> AppResult<Self> {
        let parser_dialect = dialect.into_parser_dialect();
        let statements = Parser::parse_sql(parser_dialect.as_ref(), sql)
            .map_err(|e| schema_parse_error(e.to_string()))?;
        let mut schema = Self::default();
        for stmt in statements {
            if let Statement::CreateTable(create) = stmt {
                let columns = create
                    .columns
                    .iter()
                    .map(|column| Column::new(column.name.to_string(), column.data_type.to_string()))
                    .collect();
                schema.insert_table(create.name.to_string(), columns);
            }
        }
        Ok(schema)
    }
}

impl FromIterator<(String, Vec<Column>)> for Schema {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Column>)>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect()
        }
    }
}
