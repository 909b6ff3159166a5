//! Configuration management for MediAide.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - A `.env` file in the working directory
//! - Environment variables
//! - Config files (.mediaide/config.yaml)
//! - Command-line flags
//!
//! The configuration is workspace-centric: datasets live under `data/` and
//! generated state (SQLite databases, prompt overrides) under `.mediaide/`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Main application configuration.
///
/// Built once at startup and handed to whichever component needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .mediaide/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("openai", "azure", "ollama")
    pub provider: String,

    /// Model identifier (deployment name for Azure)
    pub model: String,

    /// Explicit API key for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Dataset locations
    pub data: DataConfig,

    /// Web search settings
    pub search: SearchConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
///
/// Variants are tried in order; Azure must come first because an Azure block
/// also carries `apiKeyEnv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    AzureOpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        #[serde(rename = "endpointEnv")]
        endpoint_env: String,
        deployment: String,
        #[serde(rename = "apiVersion")]
        api_version: Option<String>,
    },
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        #[serde(rename = "endpointEnv")]
        endpoint_env: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Model (or deployment) named by this provider block.
    pub fn model(&self) -> &str {
        match self {
            Self::AzureOpenAI { deployment, .. } => deployment,
            Self::OpenAI { model, .. } => model,
            Self::Ollama { model, .. } => model,
        }
    }

    /// Environment variable holding the API key, if the provider needs one.
    pub fn api_key_env(&self) -> Option<&str> {
        match self {
            Self::AzureOpenAI { api_key_env, .. } | Self::OpenAI { api_key_env, .. } => {
                Some(api_key_env)
            }
            Self::Ollama { .. } => None,
        }
    }
}

/// Where the CSV files live and where their SQLite copies are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the CSV files (default: `<workspace>/data`)
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Directory for the generated databases (default: `<workspace>/.mediaide/database`)
    #[serde(rename = "databaseDir", default)]
    pub database_dir: Option<PathBuf>,

    /// Per-dataset CSV file name overrides, keyed by table name
    #[serde(default)]
    pub files: HashMap<String, String>,
}

/// Web search (SerpAPI) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(rename = "apiKeyEnv", default = "default_search_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_search_engine")]
    pub engine: String,

    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    #[serde(rename = "maxResults", default = "default_max_results")]
    pub max_results: usize,

    #[serde(rename = "timeoutSecs", default = "default_search_timeout")]
    pub timeout_secs: u64,
}

fn default_search_key_env() -> String {
    "SERPAPI_KEY".to_string()
}

fn default_search_engine() -> String {
    "google".to_string()
}

fn default_search_endpoint() -> String {
    "https://serpapi.com/search.json".to_string()
}

fn default_max_results() -> usize {
    3
}

fn default_search_timeout() -> u64 {
    30
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            engine: default_search_engine(),
            endpoint: default_search_endpoint(),
            max_results: default_max_results(),
            timeout_secs: default_search_timeout(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    data: Option<DataConfig>,
    search: Option<SearchConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

pub const KNOWN_PROVIDERS: [&str; 3] = ["openai", "azure", "ollama"];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
            llm: None,
            data: DataConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, environment variables, the YAML file and defaults.
    ///
    /// Environment variables:
    /// - `MEDIAIDE_WORKSPACE`: Override workspace path
    /// - `MEDIAIDE_CONFIG`: Path to config file
    /// - `MEDIAIDE_PROVIDER`: LLM provider
    /// - `MEDIAIDE_MODEL`: Model identifier
    /// - `MEDIAIDE_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Like [`AppConfig::load`], with an explicit workspace and config file
    /// taking precedence over `MEDIAIDE_WORKSPACE` and `MEDIAIDE_CONFIG`.
    ///
    /// Both are resolved before the YAML file is read, so the file that ends
    /// up merged is the one they select.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        // A missing .env is the normal case
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        config.workspace = workspace
            .or_else(|| std::env::var("MEDIAIDE_WORKSPACE").ok().map(PathBuf::from))
            .unwrap_or(config.workspace);

        config.config_file =
            config_file.or_else(|| std::env::var("MEDIAIDE_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.workspace.join(".mediaide/config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("MEDIAIDE_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("MEDIAIDE_MODEL") {
            config.model = model;
        }

        if let Ok(key) = std::env::var("MEDIAIDE_API_KEY") {
            config.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        if let Some(data) = config_file.data {
            result.data = data;
        }

        if let Some(search) = config_file.search {
            result.search = search;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the YAML file.
    /// The workspace and config file flags go through [`AppConfig::load_with`]
    /// instead, since they decide which YAML file is read.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        log_json: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if log_json {
            self.log_json = true;
        }

        self
    }

    /// Get the path to the .mediaide directory.
    pub fn mediaide_dir(&self) -> PathBuf {
        self.workspace.join(".mediaide")
    }

    /// Ensure the .mediaide directory exists.
    pub fn ensure_mediaide_dir(&self) -> AppResult<()> {
        let dir = self.mediaide_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .mediaide directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Directory holding the source CSV files.
    pub fn data_dir(&self) -> PathBuf {
        match self.data.dir {
            Some(ref dir) if dir.is_absolute() => dir.clone(),
            Some(ref dir) => self.workspace.join(dir),
            None => self.workspace.join("data"),
        }
    }

    /// Directory receiving the materialized SQLite databases.
    pub fn database_dir(&self) -> PathBuf {
        match self.data.database_dir {
            Some(ref dir) if dir.is_absolute() => dir.clone(),
            Some(ref dir) => self.workspace.join(dir),
            None => self.mediaide_dir().join("database"),
        }
    }

    /// CSV file name for a table, falling back to `default` when not overridden.
    pub fn dataset_file(&self, table: &str, default: &str) -> PathBuf {
        let name = self
            .data
            .files
            .get(table)
            .map(String::as_str)
            .unwrap_or(default);
        self.data_dir().join(name)
    }

    /// Get the configuration block for a provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Resolve the LLM API key.
    ///
    /// Order: explicit key, the provider block's `apiKeyEnv`, then `OPENAI_API_KEY`
    /// for OpenAI-style providers without a block.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(provider) {
            Some(provider_config) => provider_config
                .api_key_env()
                .and_then(|env_var| std::env::var(env_var).ok()),
            None if provider == "openai" || provider == "azure" => {
                std::env::var("OPENAI_API_KEY").ok()
            }
            None => None,
        }
    }

    /// Resolve the SerpAPI key from the configured environment variable.
    pub fn resolve_search_key(&self) -> Option<String> {
        std::env::var(&self.search.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = &self.provider;

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        match self.get_provider_config(provider) {
            Some(ProviderConfig::AzureOpenAI {
                api_key_env,
                endpoint_env,
                ..
            }) => {
                require_env(&api_key_env, "API key")?;
                require_env(&endpoint_env, "Azure endpoint")?;
            }
            Some(ProviderConfig::OpenAI { api_key_env, .. }) => {
                require_env(&api_key_env, "API key")?;
            }
            Some(ProviderConfig::Ollama { .. }) => {
                // Ollama doesn't require API keys
            }
            None if provider != "ollama" && self.resolve_api_key(provider).is_none() => {
                return Err(AppError::Config(format!(
                    "No API key configured for provider '{}'. Set MEDIAIDE_API_KEY or OPENAI_API_KEY",
                    provider
                )));
            }
            None => {}
        }

        if self.search.max_results == 0 {
            return Err(AppError::Config(
                "search.maxResults must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn require_env(var: &str, what: &str) -> AppResult<()> {
    if std::env::var(var).is_err() {
        return Err(AppError::Config(format!(
            "{} not found in environment variable: {}",
            what, var
        )));
    }
    Ok(())
}
