//! Status command handler.

use crate::app::{print_json, start};
use clap::Args;
use mediaide_core::{config::AppConfig, AppResult};
use mediaide_dispatch::{Source, StatusSnapshot};

/// Show which tools are available
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing status command");

        let status = start(config)?.get_status();

        if self.json {
            print_json(&status)
        } else {
            print_status(&status);
            Ok(())
        }
    }
}

pub fn print_status(status: &StatusSnapshot) {
    println!("System status:");
    println!("  Initialized: {}", status.initialized);
    for (label, source) in [
        ("Diabetes DB", Source::Diabetes),
        ("Cancer DB", Source::Cancer),
        ("Heart Disease DB", Source::HeartDisease),
        ("Web Search", Source::WebSearch),
    ] {
        println!("  {}: {}", label, availability(status.tools.is_bound(source)));
    }
    println!(
        "  Settings loaded: {}",
        yes_no(status.environment.settings_loaded)
    );
    println!(
        "  LLM configured: {}",
        yes_no(status.environment.llm_configured)
    );
}

fn availability(bound: bool) -> &'static str {
    if bound {
        "available"
    } else {
        "unavailable"
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
