//! Read-only query execution against a materialized dataset.

use mediaide_core::{AppError, AppResult};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::path::Path;

/// Open a dataset database that must already exist, without write access.
pub fn open_read_only(path: &Path) -> AppResult<Connection> {
    if !path.exists() {
        return Err(AppError::Dataset(format!(
            "Database not found: {:?}",
            path
        )));
    }

    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| AppError::Dataset(format!("Failed to open {:?}: {}", path, e)))
}

/// Split `sql` at the first `;` that terminates a statement.
///
/// Semicolons inside string literals, quoted identifiers and comments do not
/// count. Returns the statement (without the `;`) and whatever follows it.
pub fn split_statement(sql: &str) -> (&str, &str) {
    let bytes = sql.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b';' => return (&sql[..i], &sql[i + 1..]),
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == quote {
                        // Doubled quote is an escaped quote
                        if bytes.get(i + 1) == Some(&quote) {
                            i += 1;
                        } else {
                            break;
                        }
                    }
                    i += 1;
                }
            }
            b'[' => {
                while i < bytes.len() && bytes[i] != b']' {
                    i += 1;
                }
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/'))
                {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    (sql, "")
}

/// Accept a single `SELECT` / `WITH` statement, returning it without the
/// trailing semicolon.
pub fn ensure_read_only(sql: &str) -> AppResult<&str> {
    let (statement, rest) = split_statement(sql.trim());
    let statement = statement.trim();

    if statement.is_empty() {
        return Err(AppError::Sql("Empty SQL statement".to_string()));
    }

    if !rest.trim_matches(|c: char| c == ';' || c.is_whitespace()).is_empty() {
        return Err(AppError::Sql(
            "Only a single SQL statement is allowed".to_string(),
        ));
    }

    let keyword = statement
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if keyword != "select" && keyword != "with" {
        return Err(AppError::Sql(format!(
            "Only SELECT queries are allowed, got '{}'",
            keyword
        )));
    }

    Ok(statement)
}

/// Rows returned by [`run_query`], rendered as strings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub truncated: bool,
}

impl QueryOutput {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pipe-separated table used as LLM context.
    pub fn to_text(&self) -> String {
        if self.rows.is_empty() {
            return "(no rows)".to_string();
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(self.columns.join(" | "));
        for row in &self.rows {
            lines.push(row.join(" | "));
        }
        if self.truncated {
            lines.push(format!("... (truncated to {} rows)", self.rows.len()));
        }
        lines.join("\n")
    }
}

/// Execute a read-only statement, keeping at most `max_rows` rows.
pub fn run_query(conn: &Connection, sql: &str, max_rows: usize) -> AppResult<QueryOutput> {
    let statement = ensure_read_only(sql)?;

    let mut stmt = conn
        .prepare(statement)
        .map_err(|e| AppError::Sql(format!("Invalid SQL: {}", e)))?;

    if !stmt.readonly() {
        return Err(AppError::Sql(
            "Statement would modify the database".to_string(),
        ));
    }

    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let width = columns.len();

    let mut rows = stmt
        .query([])
        .map_err(|e| AppError::Sql(format!("Query failed: {}", e)))?;

    let mut output = QueryOutput {
        columns,
        ..Default::default()
    };

    while let Some(row) = rows
        .next()
        .map_err(|e| AppError::Sql(format!("Query failed: {}", e)))?
    {
        if output.rows.len() == max_rows {
            output.truncated = true;
            break;
        }

        let values = (0..width)
            .map(|idx| row.get_ref(idx).map(format_value))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Sql(format!("Failed to read row: {}", e)))?;
        output.rows.push(values);
    }

    tracing::debug!(
        rows = output.rows.len(),
        truncated = output.truncated,
        "Executed query: {}",
        statement
    );

    Ok(output)
}

pub(crate) fn format_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => format!("<{} bytes>", bytes.len()),
    }
}
