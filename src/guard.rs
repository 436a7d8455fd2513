//! Read-only check for model-generated SQL.
//!
//! The guard is a lexical prefix check, not a parser. It strips comments,
//! trims the text and looks at how the statement *begins*:
//!
//! 1. The text must start with `SELECT` followed by whitespace.
//! 2. The text must not start with any keyword from [`FORBIDDEN_KEYWORDS`]
//!    followed by whitespace.
//!
//! Both tests are ASCII case-insensitive. Anything else is rejected.
//!
//! # Limitations
//!
//! Only the leading statement is inspected. A payload such as
//! `SELECT 1; DROP TABLE t` is accepted, and so is a forbidden keyword
//! smuggled in later in the text. Callers that need more than a leading
//! keyword check must add it at the database layer.
//!
//! # Example
//!
//! ```
//! use promptdb::guard::is_read_only;
//!
//! assert!(is_read_only("select id from users"));
//! assert!(is_read_only("-- top ten\nSELECT * FROM users LIMIT 10"));
//! assert!(!is_read_only("/* cleanup */ DELETE FROM users"));
//! assert!(!is_read_only(""));
//! ```

use std::{borrow::Cow, fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

/// Statement-leading keywords that are never allowed.
pub const FORBIDDEN_KEYWORDS: [&str; 9] = [
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "RENAME", "TRUNCATE", "REPLACE"
];

const READ_ONLY_KEYWORD: &str = "SELECT";

/// `--` line comments and `/* */` block comments in a single alternation.
///
/// Matching both forms leftmost-first means a `--` inside a block comment is
/// consumed with the block, and a `/*` after `--` is consumed with the line.
static COMMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--[^\n]*|/\*[\s\S]*?\*/").expect("valid regex"));

/// Outcome of inspecting a candidate statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Leading keyword is `SELECT`
    ReadOnly,
    /// Nothing left after stripping comments and whitespace
    Empty,
    /// Statement does not start with `SELECT`
    NotSelect {
        /// First whitespace-delimited word of the stripped text
        leading: String
    },
    /// Statement starts with a forbidden keyword
    Forbidden {
        keyword: &'static str
    }
}

impl Verdict {
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "read-only SELECT statement"),
            Self::Empty => write!(f, "no SQL statement found"),
            Self::NotSelect {
                leading
            } => write!(f, "statement starts with '{}', expected SELECT", leading),
            Self::Forbidden {
                keyword
            } => write!(f, "statement starts with forbidden keyword {}", keyword)
        }
    }
}

/// Remove `--` and `/* */` comments from SQL text.
///
/// An unterminated block comment is left in place.
pub fn strip_comments(sql: &str) -> Cow<'_, str> {
    COMMENT_REGEX.replace_all(sql, "")
}

/// Inspect `sql` and explain whether it may be executed.
pub fn check(sql: &str) -> Verdict {
    let stripped = strip_comments(sql);
    let text = stripped.trim();
    if text.is_empty() {
        return Verdict::Empty;
    }
    if !starts_with_keyword(text, READ_ONLY_KEYWORD) {
        let leading = text.split_whitespace().next().unwrap_or_default();
        return Verdict::NotSelect {
            leading: leading.to_string()
        };
    }
    // Same anchor as above, so a keyword later in the body never matches
    if let Some(keyword) = FORBIDDEN_KEYWORDS
        .into_iter()
        .find(|keyword| starts_with_keyword(text, keyword))
    {
        return Verdict::Forbidden {
            keyword
        };
    }
    Verdict::ReadOnly
}

/// Whether `sql` is a read-only statement that may be executed.
pub fn is_read_only(sql: &str) -> bool {
    check(sql).is_read_only()
}

/// `text` begins (after optional whitespace) with `keyword` followed by
/// whitespace, compared ASCII case-insensitively.
fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    let text = text.trim_start();
    let Some(head) = text.get(..keyword.len()) else {
        return false;
    };
    head.eq_ignore_ascii_case(keyword)
        && text[keyword.len()..]
            .chars()
            .next()
            .is_some_and(char::is_whitespace)
}
