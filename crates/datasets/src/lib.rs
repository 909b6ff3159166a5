//! Disease datasets for MediAide.
//!
//! Each dataset ships as a CSV file which is materialized into its own
//! SQLite database. Queries run read-only against those databases.

pub mod dataset;
pub mod loader;
pub mod query;
pub mod schema;

pub use dataset::Dataset;
pub use loader::{materialize_csv, DatasetCatalog, LoadStats, Materializer};
pub use query::{ensure_read_only, open_read_only, run_query, split_statement, QueryOutput};
pub use schema::{describe_table, ColumnInfo, TableSchema};
