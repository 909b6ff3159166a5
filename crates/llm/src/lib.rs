//! LLM integration crate for MediAide.
//!
//! This crate provides a provider-agnostic abstraction for interacting with
//! Large Language Models. The SQL agents use it to translate questions into
//! SQL and to phrase query results as answers.
//!
//! # Providers
//! - **OpenAI**: any OpenAI-compatible chat completions endpoint
//! - **Azure OpenAI**: deployment-scoped chat completions
//! - **Ollama**: local LLM runtime (default)
//!
//! # Example
//! ```no_run
//! use mediaide_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("How many rows are in the table?", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, create_client_from_config, ClientOptions};
pub use providers::{OllamaClient, OpenAiClient};
pub use types::ProviderType;
