//! Explicit runtime settings shared by the tools.
//!
//! Built once from [`AppConfig`] at startup and handed to whatever needs the
//! language model or the search credentials.

use mediaide_core::config::AppConfig;
use mediaide_core::{AppError, AppResult};
use mediaide_llm::{create_client_from_config, LlmClient, LlmRequest};
use mediaide_prompt::BuiltPrompt;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared language-model handle.
#[derive(Clone)]
pub struct LlmHandle {
    pub client: Arc<dyn LlmClient>,
    pub model: String,
    pub temperature: f32,
}

impl LlmHandle {
    /// Handle with deterministic sampling.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: 0.0,
        }
    }

    /// Send a rendered prompt and return the trimmed completion text.
    pub async fn complete(&self, prompt: &BuiltPrompt) -> AppResult<String> {
        let mut request =
            LlmRequest::new(prompt.user.clone(), self.model.clone()).with_temperature(self.temperature);
        if let Some(ref system) = prompt.system {
            request = request.with_system(system.clone());
        }

        tracing::debug!(
            provider = self.client.provider_name(),
            model = %self.model,
            prompt = %prompt.metadata.source_prompt_id,
            "Sending completion request"
        );

        let response = self.client.complete(&request).await?;
        let content = response.content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::Llm(format!(
                "Empty response from {}",
                self.client.provider_name()
            )));
        }
        Ok(content)
    }
}

impl fmt::Debug for LlmHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmHandle")
            .field("provider", &self.client.provider_name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// SerpAPI connection settings.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub api_key: String,
    pub engine: String,
    pub endpoint: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl SearchSettings {
    /// `None` when no SerpAPI key is available.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let api_key = config.resolve_search_key()?;
        Some(Self {
            api_key,
            engine: config.search.engine.clone(),
            endpoint: config.search.endpoint.clone(),
            max_results: config.search.max_results,
            timeout_secs: config.search.timeout_secs,
        })
    }
}

/// Everything the tools need at runtime.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Workspace root (prompt overrides live below it)
    pub workspace: PathBuf,

    /// Absent when no language model could be configured
    pub llm: Option<LlmHandle>,

    /// Absent when no search key is configured
    pub search: Option<SearchSettings>,

    /// Directory of the materialized dataset databases
    pub database_dir: PathBuf,
}

impl Settings {
    /// Build settings from the loaded configuration.
    ///
    /// Fails only when the configuration itself is invalid. A model client
    /// that cannot be created leaves `llm` empty; a missing search key leaves
    /// `search` empty.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let model = config
            .get_provider_config(&config.provider)
            .map(|provider| provider.model().to_string())
            .unwrap_or_else(|| config.model.clone());

        let llm = match create_client_from_config(config) {
            Ok(client) => Some(LlmHandle::new(client, model)),
            Err(e) => {
                tracing::warn!("Language model unavailable: {}", e);
                None
            }
        };

        let search = SearchSettings::from_config(config);
        if search.is_none() {
            tracing::warn!(
                "Web search disabled: {} is not set",
                config.search.api_key_env
            );
        }

        Ok(Self {
            workspace: config.workspace.clone(),
            llm,
            search,
            database_dir: config.database_dir(),
        })
    }
}
