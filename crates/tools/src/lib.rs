//! Query tools for MediAide.
//!
//! - [`SqlAgent`]: question → SQL → rows → answer, over one dataset
//! - [`WebSearchTool`]: SerpAPI search formatted as titled snippets
//! - [`Settings`]: the explicit configuration value the tools are built from

pub mod settings;
pub mod sql_agent;
pub mod tool;
pub mod web_search;

#[cfg(test)]
mod testing;

pub use settings::{LlmHandle, SearchSettings, Settings};
pub use sql_agent::{extract_sql, SqlAgent, SqlAgentFactory};
pub use tool::{QueryTool, ToolBinding, ToolFactory, ToolOutput};
pub use web_search::WebSearchTool;
