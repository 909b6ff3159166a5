//! CSV → SQLite materialization.
//!
//! Each call replaces the whole table: drop, create with inferred column
//! affinities, insert every row, all inside one transaction.

use crate::dataset::Dataset;
use mediaide_core::{AppConfig, AppError, AppResult};
use rusqlite::types::Value;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Column affinity inferred from the CSV values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    fn sql(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }

    /// Widen the type so that `value` still fits.
    fn widen(self, value: &str) -> Self {
        match self {
            Self::Integer if value.parse::<i64>().is_ok() => Self::Integer,
            Self::Integer | Self::Real if value.parse::<f64>().is_ok() => Self::Real,
            _ => Self::Text,
        }
    }

    fn to_value(self, raw: &str) -> Value {
        if raw.is_empty() {
            return Value::Null;
        }
        match self {
            Self::Integer => raw
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Text(raw.to_string())),
            Self::Real => raw
                .parse::<f64>()
                .map(Value::Real)
                .unwrap_or_else(|_| Value::Text(raw.to_string())),
            Self::Text => Value::Text(raw.to_string()),
        }
    }
}

/// Outcome of one materialization.
#[derive(Debug, Clone, Serialize)]
pub struct LoadStats {
    pub table: String,
    pub rows: usize,
    pub columns: usize,
    pub database: PathBuf,
}

/// Anything able to (re)build a dataset's table.
pub trait Materializer: Send + Sync {
    fn materialize(&self, dataset: Dataset) -> AppResult<LoadStats>;
}

/// Quote an SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Load `csv_path` into `table` of the SQLite database at `db_path`,
/// replacing any prior contents.
pub fn materialize_csv(csv_path: &Path, db_path: &Path, table: &str) -> AppResult<LoadStats> {
    if !csv_path.exists() {
        return Err(AppError::Dataset(format!(
            "CSV file not found: {:?}",
            csv_path
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .map_err(|e| AppError::Dataset(format!("Failed to open {:?}: {}", csv_path, e)))?;

    let headers = dedupe_headers(
        reader
            .headers()
            .map_err(|e| AppError::Dataset(format!("Failed to read CSV header: {}", e)))?
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                if name.is_empty() {
                    format!("column_{}", idx + 1)
                } else {
                    name.to_string()
                }
            }),
    );

    if headers.is_empty() {
        return Err(AppError::Dataset(format!(
            "CSV file {:?} has no columns",
            csv_path
        )));
    }

    let records: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .map_err(|e| AppError::Dataset(format!("Failed to parse {:?}: {}", csv_path, e)))?;

    let types = infer_column_types(headers.len(), &records);

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::Dataset(format!("Failed to create database directory: {}", e))
        })?;
    }

    let mut conn = Connection::open(db_path)
        .map_err(|e| AppError::Dataset(format!("Failed to open {:?}: {}", db_path, e)))?;

    write_table(&mut conn, table, &headers, &types, &records)?;

    tracing::debug!(
        table,
        rows = records.len(),
        columns = headers.len(),
        "Materialized {:?} into {:?}",
        csv_path,
        db_path
    );

    Ok(LoadStats {
        table: table.to_string(),
        rows: records.len(),
        columns: headers.len(),
        database: db_path.to_path_buf(),
    })
}

/// Rename repeated headers to `name.1`, `name.2`, ...
///
/// SQLite column names are case-insensitive, so `Age` and `age` collide too.
fn dedupe_headers(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .map(|name| {
            let mut candidate = name.clone();
            let mut suffix = 1;
            while !seen.insert(candidate.to_lowercase()) {
                candidate = format!("{}.{}", name, suffix);
                suffix += 1;
            }
            candidate
        })
        .collect()
}

fn infer_column_types(width: usize, records: &[csv::StringRecord]) -> Vec<ColumnType> {
    let mut types = vec![ColumnType::Integer; width];
    let mut seen = vec![false; width];

    for record in records {
        for (idx, value) in record.iter().enumerate().take(width) {
            if value.is_empty() {
                continue;
            }
            seen[idx] = true;
            types[idx] = types[idx].widen(value);
        }
    }

    // A column with no values at all carries no numeric evidence
    types
        .into_iter()
        .zip(seen)
        .map(|(ty, seen)| if seen { ty } else { ColumnType::Text })
        .collect()
}

fn write_table(
    conn: &mut Connection,
    table: &str,
    headers: &[String],
    types: &[ColumnType],
    records: &[csv::StringRecord],
) -> AppResult<()> {
    let sql_err = |e: rusqlite::Error| AppError::Dataset(format!("Failed to write table '{}': {}", table, e));

    let columns = headers
        .iter()
        .zip(types)
        .map(|(name, ty)| format!("{} {}", quote_ident(name), ty.sql()))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=headers.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");

    let tx = conn.transaction().map_err(sql_err)?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({columns});",
        table = quote_ident(table),
        columns = columns
    ))
    .map_err(sql_err)?;

    {
        let mut stmt = tx
            .prepare(&format!(
                "INSERT INTO {} VALUES ({})",
                quote_ident(table),
                placeholders
            ))
            .map_err(sql_err)?;

        for record in records {
            let values = types
                .iter()
                .enumerate()
                .map(|(idx, ty)| ty.to_value(record.get(idx).unwrap_or("")));
            stmt.execute(rusqlite::params_from_iter(values))
                .map_err(sql_err)?;
        }
    }

    tx.commit().map_err(sql_err)
}

/// Maps each dataset to its CSV file and its SQLite database.
#[derive(Debug, Clone)]
pub struct DatasetCatalog {
    csv_paths: HashMap<Dataset, PathBuf>,
    database_dir: PathBuf,
}

impl DatasetCatalog {
    /// Catalog using the default CSV file names inside `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>, database_dir: impl Into<PathBuf>) -> Self {
        let csv_paths = Dataset::ALL
            .iter()
            .map(|d| (*d, data_dir.as_ref().join(d.default_file())))
            .collect();

        Self {
            csv_paths,
            database_dir: database_dir.into(),
        }
    }

    /// Catalog honoring the configured directories and file overrides.
    pub fn from_config(config: &AppConfig) -> Self {
        let csv_paths = Dataset::ALL
            .iter()
            .map(|d| (*d, config.dataset_file(d.table_name(), d.default_file())))
            .collect();

        Self {
            csv_paths,
            database_dir: config.database_dir(),
        }
    }

    /// Point a dataset at a different CSV file.
    pub fn with_csv(mut self, dataset: Dataset, path: impl Into<PathBuf>) -> Self {
        self.csv_paths.insert(dataset, path.into());
        self
    }

    pub fn csv_path(&self, dataset: Dataset) -> PathBuf {
        self.csv_paths
            .get(&dataset)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(dataset.default_file()))
    }

    pub fn database_path(&self, dataset: Dataset) -> PathBuf {
        self.database_dir.join(dataset.database_file())
    }
}

impl Materializer for DatasetCatalog {
    fn materialize(&self, dataset: Dataset) -> AppResult<LoadStats> {
        materialize_csv(
            &self.csv_path(dataset),
            &self.database_path(dataset),
            dataset.table_name(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DIABETES_CSV: &str = "\
Pregnancies,Glucose,BMI,Age,Outcome,Notes
6,148,33.6,50,1,
1,85,26.6,31,0,follow-up
8,183,23.3,32,1,
0,,28.1,21,0,\"says \"\"fine\"\"\"
";

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn column_types(conn: &Connection, table: &str) -> Vec<(String, String)> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))
            .unwrap();
        stmt.query_map([], |row| Ok((row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_widen() {
        assert_eq!(ColumnType::Integer.widen("42"), ColumnType::Integer);
        assert_eq!(ColumnType::Integer.widen("4.2"), ColumnType::Real);
        assert_eq!(ColumnType::Real.widen("7"), ColumnType::Real);
        assert_eq!(ColumnType::Real.widen("n/a"), ColumnType::Text);
        assert_eq!(ColumnType::Text.widen("7"), ColumnType::Text);
    }

    #[test]
    fn test_materialize_infers_types_and_nulls() {
        let temp_dir = TempDir::new().unwrap();
        let csv_path = write_csv(temp_dir.path(), "diabetes.csv", DIABETES_CSV);
        let db_path = temp_dir.path().join("db/diabetes.db");

        let stats = materialize_csv(&csv_path, &db_path, "diabetes").unwrap();
        assert_eq!(stats.rows, 4);
        assert_eq!(stats.columns, 6);

        let conn = Connection::open(&db_path).unwrap();
        let types = column_types(&conn, "diabetes");
        assert_eq!(
            types,
            vec![
                ("Pregnancies".to_string(), "INTEGER".to_string()),
                ("Glucose".to_string(), "INTEGER".to_string()),
                ("BMI".to_string(), "REAL".to_string()),
                ("Age".to_string(), "INTEGER".to_string()),
                ("Outcome".to_string(), "INTEGER".to_string()),
                ("Notes".to_string(), "TEXT".to_string()),
            ]
        );

        let missing_glucose: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM diabetes WHERE Glucose IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(missing_glucose, 1);

        let note: String = conn
            .query_row("SELECT Notes FROM diabetes WHERE Age = 21", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(note, "says \"fine\"");
    }

    #[test]
    fn test_materialize_replaces_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let csv_path = write_csv(temp_dir.path(), "diabetes.csv", DIABETES_CSV);
        let db_path = temp_dir.path().join("diabetes.db");

        materialize_csv(&csv_path, &db_path, "diabetes").unwrap();
        materialize_csv(&csv_path, &db_path, "diabetes").unwrap();

        let conn = Connection::open(&db_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM diabetes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 4);

        // Shrinking the source shrinks the table
        write_csv(temp_dir.path(), "diabetes.csv", "Age\n40\n");
        materialize_csv(&csv_path, &db_path, "diabetes").unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM diabetes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_missing_csv_is_dataset_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = materialize_csv(
            &temp_dir.path().join("absent.csv"),
            &temp_dir.path().join("absent.db"),
            "absent",
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Dataset(_)));
    }

    #[test]
    fn test_ragged_csv_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let csv_path = write_csv(temp_dir.path(), "heart.csv", "Age,Sex\n52,1\n53\n");
        let result = materialize_csv(&csv_path, &temp_dir.path().join("h.db"), "heart_disease");
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_headers_are_renamed() {
        let temp_dir = TempDir::new().unwrap();
        let csv_path = write_csv(
            temp_dir.path(),
            "cancer.csv",
            "Age,BMI,Age,age,Age.1\n50,22.5,51,52,x\n",
        );
        let db_path = temp_dir.path().join("c.db");

        let stats = materialize_csv(&csv_path, &db_path, "cancer").unwrap();
        assert_eq!(stats.columns, 5);

        let conn = Connection::open(&db_path).unwrap();
        let names: Vec<String> = column_types(&conn, "cancer")
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["Age", "BMI", "Age.1", "age.2", "Age.1.1"]);

        let second_age: i64 = conn
            .query_row("SELECT \"Age.1\" FROM cancer", [], |row| row.get(0))
            .unwrap();
        assert_eq!(second_age, 51);
    }

    #[test]
    fn test_catalog_paths() {
        let catalog = DatasetCatalog::new("/data", "/db")
            .with_csv(Dataset::Cancer, "/elsewhere/cancer.csv");

        assert_eq!(
            catalog.csv_path(Dataset::Diabetes),
            PathBuf::from("/data/diabetes.csv")
        );
        assert_eq!(
            catalog.csv_path(Dataset::Cancer),
            PathBuf::from("/elsewhere/cancer.csv")
        );
        assert_eq!(
            catalog.database_path(Dataset::HeartDisease),
            PathBuf::from("/db/heart_disease.db")
        );
    }

    #[test]
    fn test_catalog_materialize() {
        let temp_dir = TempDir::new().unwrap();
        write_csv(temp_dir.path(), "heart.csv", "Age,Sex,target\n63,1,1\n37,1,1\n41,0,0\n");
        let catalog = DatasetCatalog::new(temp_dir.path(), temp_dir.path().join("db"));

        let stats = catalog.materialize(Dataset::HeartDisease).unwrap();
        assert_eq!(stats.table, "heart_disease");
        assert_eq!(stats.rows, 3);
        assert!(catalog.database_path(Dataset::HeartDisease).exists());

        assert!(catalog.materialize(Dataset::Cancer).is_err());
    }
}
