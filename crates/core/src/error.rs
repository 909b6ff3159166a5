//! Error types for MediAide.
//!
//! One enum covers every failure category below the dispatcher: configuration,
//! I/O, language model, dataset loading, SQL execution, web search, tool
//! construction and prompts. The dispatcher turns all of them into data.

use thiserror::Error;

/// Unified error type for MediAide.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// CSV ingestion and table materialization errors
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// SQL validation and execution errors
    #[error("SQL error: {0}")]
    Sql(String),

    /// Web search errors
    #[error("Search error: {0}")]
    Search(String),

    /// Tool construction and invocation errors
    #[error("Tool error: {0}")]
    Tool(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
