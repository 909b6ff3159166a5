//! LLM provider factory.
//!
//! Creates LLM clients from a provider name plus resolved options, or directly
//! from the application configuration (endpoint, key and API version lookup).

use crate::client::LlmClient;
use crate::providers::ollama::DEFAULT_OLLAMA_URL;
use crate::providers::openai::{DEFAULT_AZURE_API_VERSION, DEFAULT_OPENAI_URL};
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use mediaide_core::config::{AppConfig, ProviderConfig};
use mediaide_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Resolved connection options for a provider.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Base URL (OpenAI-compatible server, Azure resource, or Ollama host)
    pub endpoint: Option<String>,

    /// API key for providers that require one
    pub api_key: Option<String>,

    /// Azure `api-version` query parameter
    pub api_version: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Create an LLM client based on the provider name.
///
/// # Errors
/// Returns error if:
/// - Provider is unknown
/// - A required API key or endpoint is missing
/// - The HTTP client cannot be built
pub fn create_client(provider: &str, options: &ClientOptions) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    if provider_type.requires_api_key() && options.api_key.is_none() {
        return Err(AppError::Config(format!(
            "{} provider requires API key",
            provider_type.as_str()
        )));
    }

    let timeout = options.timeout_secs.map(Duration::from_secs);

    match provider_type {
        ProviderType::Ollama => {
            let base_url = options.endpoint.as_deref().unwrap_or(DEFAULT_OLLAMA_URL);
            let client = match timeout {
                Some(timeout) => OllamaClient::with_timeout(base_url, timeout)?,
                None => OllamaClient::with_base_url(base_url),
            };
            Ok(Arc::new(client))
        }
        ProviderType::OpenAI => {
            let base_url = options.endpoint.as_deref().unwrap_or(DEFAULT_OPENAI_URL);
            let client = OpenAiClient::new(base_url, options.api_key.clone().unwrap_or_default());
            Ok(Arc::new(apply_timeout(client, timeout)?))
        }
        ProviderType::AzureOpenAI => {
            let endpoint = options.endpoint.as_deref().ok_or_else(|| {
                AppError::Config("Azure provider requires an endpoint".to_string())
            })?;
            let api_version = options
                .api_version
                .as_deref()
                .unwrap_or(DEFAULT_AZURE_API_VERSION);
            let client = OpenAiClient::azure(
                endpoint,
                options.api_key.clone().unwrap_or_default(),
                api_version,
            );
            Ok(Arc::new(apply_timeout(client, timeout)?))
        }
    }
}

fn apply_timeout(client: OpenAiClient, timeout: Option<Duration>) -> AppResult<OpenAiClient> {
    match timeout {
        Some(timeout) => client.with_timeout(timeout),
        None => Ok(client),
    }
}

/// Create the client for the configured active provider.
///
/// Without a provider block, OpenAI-style providers fall back to the
/// `OPENAI_API_BASE` and `OPENAI_API_VERSION` environment variables.
pub fn create_client_from_config(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let options = resolve_options(config)?;
    tracing::debug!(
        provider = %config.provider,
        endpoint = ?options.endpoint,
        "Creating LLM client"
    );
    create_client(&config.provider, &options)
}

fn resolve_options(config: &AppConfig) -> AppResult<ClientOptions> {
    let api_key = config.resolve_api_key(&config.provider);

    let options = match config.get_provider_config(&config.provider) {
        Some(ProviderConfig::Ollama {
            endpoint, timeout, ..
        }) => ClientOptions {
            endpoint: Some(endpoint),
            api_key,
            api_version: None,
            timeout_secs: timeout,
        },
        Some(ProviderConfig::OpenAI {
            endpoint,
            endpoint_env,
            ..
        }) => ClientOptions {
            endpoint: endpoint.or_else(|| endpoint_env.and_then(|var| std::env::var(var).ok())),
            api_key,
            ..ClientOptions::default()
        },
        Some(ProviderConfig::AzureOpenAI {
            endpoint_env,
            api_version,
            ..
        }) => ClientOptions {
            endpoint: Some(std::env::var(&endpoint_env).map_err(|_| {
                AppError::Config(format!(
                    "Azure endpoint not found in environment variable: {}",
                    endpoint_env
                ))
            })?),
            api_key,
            api_version: api_version.or_else(|| std::env::var("OPENAI_API_VERSION").ok()),
            timeout_secs: None,
        },
        None if config.provider == "ollama" => ClientOptions {
            api_key,
            ..ClientOptions::default()
        },
        None => ClientOptions {
            endpoint: std::env::var("OPENAI_API_BASE").ok(),
            api_key,
            api_version: std::env::var("OPENAI_API_VERSION").ok(),
            timeout_secs: None,
        },
    };

    Ok(options)
}
