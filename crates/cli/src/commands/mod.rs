//! Command handlers for the MediAide CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod all;
pub mod ask;
pub mod chat;
pub mod load;
pub mod prompts;
pub mod status;

// Re-export command types for convenience
pub use all::AllCommand;
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use load::LoadCommand;
pub use prompts::PromptsCommand;
pub use status::StatusCommand;
