//! Table descriptions fed to the SQL generation prompt.

use crate::loader::quote_ident;
use crate::query::format_value;
use mediaide_core::{AppError, AppResult};
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
}

/// Columns, row count and a few sample rows of one table.
#[derive(Debug, Clone, Serialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
    pub row_count: i64,
    pub sample_rows: Vec<Vec<String>>,
}

impl TableSchema {
    /// Render as a `CREATE TABLE` statement followed by sample rows in a
    /// comment block.
    pub fn to_prompt_context(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("\t{} {}", quote_ident(&c.name), c.declared_type))
            .collect::<Vec<_>>()
            .join(",\n");

        let mut out = format!(
            "CREATE TABLE {} (\n{}\n)",
            quote_ident(&self.table),
            columns
        );

        if !self.sample_rows.is_empty() {
            let header = self
                .columns
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join("\t");
            let rows = self
                .sample_rows
                .iter()
                .map(|row| row.join("\t"))
                .collect::<Vec<_>>()
                .join("\n");

            out.push_str(&format!(
                "\n\n/*\n{} rows from {} table ({} rows total):\n{}\n{}\n*/",
                self.sample_rows.len(),
                self.table,
                self.row_count,
                header,
                rows
            ));
        }

        out
    }
}

/// Describe `table`, including up to `sample_rows` rows.
pub fn describe_table(conn: &Connection, table: &str, sample_rows: usize) -> AppResult<TableSchema> {
    let sql_err = |e: rusqlite::Error| {
        AppError::Dataset(format!("Failed to describe table '{}': {}", table, e))
    };

    let columns: Vec<ColumnInfo> = {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))
            .map_err(sql_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get(1)?,
                    declared_type: row.get(2)?,
                })
            })
            .map_err(sql_err)?;
        rows.collect::<Result<_, _>>().map_err(sql_err)?
    };

    if columns.is_empty() {
        return Err(AppError::Dataset(format!(
            "Table '{}' does not exist",
            table
        )));
    }

    let row_count: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |row| row.get(0),
        )
        .map_err(sql_err)?;

    let mut samples = Vec::new();
    if sample_rows > 0 {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT * FROM {} LIMIT {}",
                quote_ident(table),
                sample_rows
            ))
            .map_err(sql_err)?;
        let mut rows = stmt.query([]).map_err(sql_err)?;
        while let Some(row) = rows.next().map_err(sql_err)? {
            let values = (0..columns.len())
                .map(|idx| row.get_ref(idx).map(format_value))
                .collect::<Result<Vec<_>, _>>()
                .map_err(sql_err)?;
            samples.push(values);
        }
    }

    Ok(TableSchema {
        table: table.to_string(),
        columns,
        row_count,
        sample_rows: samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heart_table() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE heart_disease (age INTEGER, chol REAL, target INTEGER);
             INSERT INTO heart_disease VALUES (63, 233.0, 1);
             INSERT INTO heart_disease VALUES (37, 250.5, 1);
             INSERT INTO heart_disease VALUES (41, 204.0, 0);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_describe_table() {
        let conn = heart_table();
        let schema = describe_table(&conn, "heart_disease", 2).unwrap();

        assert_eq!(schema.row_count, 3);
        assert_eq!(schema.columns.len(), 3);
        assert_eq!(schema.columns[1].name, "chol");
        assert_eq!(schema.columns[1].declared_type, "REAL");
        assert_eq!(schema.sample_rows.len(), 2);
        assert_eq!(schema.sample_rows[0], vec!["63", "233", "1"]);
    }

    #[test]
    fn test_prompt_context() {
        let conn = heart_table();
        let context = describe_table(&conn, "heart_disease", 1)
            .unwrap()
            .to_prompt_context();

        assert!(context.starts_with("CREATE TABLE \"heart_disease\" (\n\t\"age\" INTEGER,"));
        assert!(context.contains("1 rows from heart_disease table (3 rows total):"));
        assert!(context.contains("age\tchol\ttarget\n63\t233\t1"));
    }

    #[test]
    fn test_prompt_context_without_samples() {
        let conn = heart_table();
        let context = describe_table(&conn, "heart_disease", 0)
            .unwrap()
            .to_prompt_context();
        assert!(context.ends_with(")"));
        assert!(!context.contains("/*"));
    }

    #[test]
    fn test_describe_missing_table() {
        let conn = heart_table();
        assert!(describe_table(&conn, "diabetes", 3).is_err());
    }
}
