//! Chat command handler.
//!
//! Line-oriented loop over stdin. `<verb>: <question>` picks a source,
//! bare text is a web search.

use crate::app::start;
use crate::commands::all::print_aggregate;
use crate::commands::ask::print_record;
use crate::commands::load::reload_and_report;
use crate::commands::status::print_status;
use clap::Args;
use mediaide_core::{config::AppConfig, AppResult};
use mediaide_dispatch::Source;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive question loop
#[derive(Args, Debug)]
pub struct ChatCommand {}

#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Quit,
    Test,
    Empty,
    Ask(Source, String),
    All(String),
    Unknown(String),
}

fn parse_input(line: &str) -> ChatInput {
    let line = line.trim();
    let lower = line.to_lowercase();

    if matches!(lower.as_str(), "quit" | "exit" | "q") {
        return ChatInput::Quit;
    }
    if lower == "test" {
        return ChatInput::Test;
    }
    if line.is_empty() {
        return ChatInput::Empty;
    }

    let Some((command, question)) = line.split_once(':') else {
        return ChatInput::Ask(Source::WebSearch, line.to_string());
    };

    let command = command.trim().to_lowercase();
    let question = question.trim().to_string();
    match command.as_str() {
        "diabetes" => ChatInput::Ask(Source::Diabetes, question),
        "cancer" => ChatInput::Ask(Source::Cancer, question),
        "heart" | "heart_disease" => ChatInput::Ask(Source::HeartDisease, question),
        "search" => ChatInput::Ask(Source::WebSearch, question),
        "all" => ChatInput::All(question),
        _ => ChatInput::Unknown(command),
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let app = start(config)?;

        println!("Welcome to MediAide");
        println!();
        print_status(&app.get_status());
        print_help();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("\nYour question: ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };

            match parse_input(&line) {
                ChatInput::Quit => break,
                ChatInput::Empty => continue,
                ChatInput::Test => reload_and_report(config),
                ChatInput::Unknown(command) => println!("Unknown command: {}", command),
                ChatInput::Ask(source, question) => {
                    println!("\nProcessing: {}", question);
                    let record = app.query(source, &question).await;
                    println!();
                    print_record(&record);
                }
                ChatInput::All(question) => {
                    println!("\nProcessing: {}", question);
                    let result = app.get_comprehensive_answer(&question, &[]).await;
                    println!();
                    print_aggregate(&result, false);
                }
            }
        }

        println!("Thank you for using MediAide!");
        Ok(())
    }
}

fn print_help() {
    println!();
    println!("Ask medical questions, or type 'quit' to exit.");
    println!("Commands:");
    println!("  diabetes: <question>  - Query the diabetes dataset");
    println!("  cancer: <question>    - Query the cancer dataset");
    println!("  heart: <question>     - Query the heart disease dataset");
    println!("  search: <question>    - Search the web");
    println!("  all: <question>       - Query every source");
    println!("  test                  - Reload the datasets");
}
