//! Prompts command handler.

use clap::Args;
use mediaide_core::{config::AppConfig, AppResult};
use mediaide_prompt::{list_prompts, load_prompt};

/// List available prompts
#[derive(Args, Debug)]
pub struct PromptsCommand {}

impl PromptsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing prompts command");

        for id in list_prompts(&config.workspace)? {
            match load_prompt(&config.workspace, &id) {
                Ok(prompt) => println!("{}  {}", id, prompt.title),
                Err(e) => println!("{}  (invalid: {})", id, e),
            }
        }

        Ok(())
    }
}
