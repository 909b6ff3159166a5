//! All command handler.
//!
//! Fans one question out to several sources.

use crate::app::{print_json, start};
use clap::Args;
use mediaide_core::{config::AppConfig, AppResult};
use mediaide_dispatch::{AggregateResult, Source};

/// Characters of each answer shown unless `--full` is given.
const PREVIEW_CHARS: usize = 200;

/// Ask several sources the same question
#[derive(Args, Debug)]
pub struct AllCommand {
    /// The question to ask
    pub question: String,

    /// Comma-separated sources (default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub sources: Vec<Source>,

    /// Show complete answers
    #[arg(long)]
    pub full: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AllCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing all command");
        tracing::debug!("All command options: {:?}", self);

        let app = start(config)?;
        let result = app
            .get_comprehensive_answer(&self.question, &self.sources)
            .await;

        if self.json {
            print_json(&result)
        } else {
            print_aggregate(&result, self.full);
            Ok(())
        }
    }
}

pub fn print_aggregate(result: &AggregateResult, full: bool) {
    println!("Comprehensive results:");
    for (source, record) in &result.responses {
        println!();
        println!("[{}]", source.key().to_uppercase());
        let answer = if full {
            record.answer().to_string()
        } else {
            preview(record.answer(), PREVIEW_CHARS)
        };
        println!("   {}", answer);
    }
}

/// First `max_chars` characters, with an ellipsis when cut.
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("1500", 200), "1500");
    }

    #[test]
    fn test_preview_cuts_on_char_boundary() {
        let text = "é".repeat(250);
        let cut = preview(&text, 200);
        assert_eq!(cut.chars().count(), 203);
        assert!(cut.ends_with("..."));
    }
}
