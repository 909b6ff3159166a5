//! Load command handler.
//!
//! Materializes every dataset CSV into its SQLite database.

use crate::app::print_json;
use clap::Args;
use mediaide_core::{config::AppConfig, AppError, AppResult};
use mediaide_datasets::{Dataset, DatasetCatalog, Materializer};
use serde::Serialize;

/// Load the CSV datasets into their databases
#[derive(Args, Debug)]
pub struct LoadCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadReport {
    dataset: Dataset,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl LoadCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing load command");

        let reports = load_datasets(config);
        let failed = reports.iter().filter(|report| !report.success).count();

        if self.json {
            print_json(&reports)?;
        } else {
            print_reports(&reports);
        }

        if failed > 0 {
            return Err(AppError::Dataset(format!(
                "{} of {} datasets failed to load",
                failed,
                reports.len()
            )));
        }
        Ok(())
    }
}

fn load_datasets(config: &AppConfig) -> Vec<LoadReport> {
    let catalog = DatasetCatalog::from_config(config);

    Dataset::ALL
        .iter()
        .map(|dataset| match catalog.materialize(*dataset) {
            Ok(stats) => LoadReport {
                dataset: *dataset,
                success: true,
                rows: Some(stats.rows),
                columns: Some(stats.columns),
                error: None,
            },
            Err(e) => LoadReport {
                dataset: *dataset,
                success: false,
                rows: None,
                columns: None,
                error: Some(e.to_string()),
            },
        })
        .collect()
}

fn print_reports(reports: &[LoadReport]) {
    for report in reports {
        match (&report.error, report.rows, report.columns) {
            (None, Some(rows), Some(columns)) => println!(
                "{} dataset: loaded {} rows, {} columns",
                report.dataset.display_name(),
                rows,
                columns
            ),
            (error, _, _) => println!(
                "{} dataset: FAILED ({})",
                report.dataset.display_name(),
                error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

/// Reload every dataset and print the outcome; used by the chat `test` verb.
pub fn reload_and_report(config: &AppConfig) {
    print_reports(&load_datasets(config));
}
