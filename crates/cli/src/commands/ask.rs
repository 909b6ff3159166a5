//! Ask command handler.
//!
//! Sends one question to one source.

use crate::app::{print_json, start};
use clap::Args;
use mediaide_core::{config::AppConfig, AppResult};
use mediaide_dispatch::{ResultRecord, Source};

/// Ask one source a question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Source to ask (diabetes, cancer, heart, search)
    #[arg(short, long, default_value = "search")]
    pub source: Source,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let app = start(config)?;
        let record = app.query(self.source, &self.question).await;

        if self.json {
            print_json(&record)
        } else {
            print_record(&record);
            Ok(())
        }
    }
}

/// Human-readable rendering of one result.
pub fn print_record(record: &ResultRecord) {
    println!("Answer ({}):", record.source());
    println!("{}", record.answer());
    if let Some(ref sql) = record.metadata().sql {
        println!();
        println!("SQL: {}", sql);
    }
}
