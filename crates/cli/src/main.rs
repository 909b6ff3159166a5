//! MediAide CLI
//!
//! Main entry point for the mediaide command-line tool.
//! Routes medical questions to the disease datasets or the web.

mod app;
mod commands;

use clap::{Parser, Subcommand};
use commands::{
    AllCommand, AskCommand, ChatCommand, LoadCommand, PromptsCommand, StatusCommand,
};
use mediaide_core::logging::{self, LogFormat};
use mediaide_core::{config::AppConfig, AppResult};
use std::path::PathBuf;

/// MediAide - medical questions answered from disease datasets and the web
#[derive(Parser, Debug)]
#[command(name = "mediaide")]
#[command(about = "Medical questions answered from disease datasets and the web", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "MEDIAIDE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "MEDIAIDE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (openai, azure, ollama)
    #[arg(short, long, global = true, env = "MEDIAIDE_PROVIDER")]
    provider: Option<String>,

    /// Model identifier (or Azure deployment)
    #[arg(short, long, global = true, env = "MEDIAIDE_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask one source
    Ask(AskCommand),

    /// Ask several sources at once
    All(AllCommand),

    /// Show which tools are available
    Status(StatusCommand),

    /// Load the CSV datasets into their databases
    Load(LoadCommand),

    /// List available prompts
    Prompts(PromptsCommand),

    /// Interactive question loop
    Chat(ChatCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from .env, environment and config file
    let config = AppConfig::load_with(cli.workspace, cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
        cli.log_json,
    );

    let format = if config.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    logging::init_logging(config.log_level.as_deref(), config.no_color, format)?;

    tracing::info!("MediAide CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    // Ensure .mediaide directory exists
    config.ensure_mediaide_dir()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::All(_) => "all",
        Commands::Status(_) => "status",
        Commands::Load(_) => "load",
        Commands::Prompts(_) => "prompts",
        Commands::Chat(_) => "chat",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::All(cmd) => cmd.execute(&config).await,
        Commands::Status(cmd) => cmd.execute(&config).await,
        Commands::Load(cmd) => cmd.execute(&config).await,
        Commands::Prompts(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
