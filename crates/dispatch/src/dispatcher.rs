//! The MediAide dispatcher.
//!
//! Routes a question to one source or fans it out to several, turning every
//! outcome (missing binding, tool error, tool panic) into a [`ResultRecord`].
//! No public operation returns an error.

use crate::provider::{ConfiguredTools, ToolProvider};
use crate::record::{AggregateResult, ResultRecord};
use crate::source::Source;
use crate::status::{EnvironmentStatus, StatusSnapshot, ToolsStatus};
use futures::FutureExt;
use indexmap::IndexMap;
use mediaide_datasets::{Dataset, DatasetCatalog, Materializer};
use mediaide_tools::{Settings, ToolBinding};
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

pub struct MediAide {
    settings: Option<Settings>,
    materializer: Arc<dyn Materializer>,
    provider: Arc<dyn ToolProvider>,
    tools: HashMap<Source, Option<ToolBinding>>,
    initialized: bool,
}

impl MediAide {
    /// Dispatcher with every source unbound. Call [`MediAide::initialize`]
    /// to materialize the datasets and bind the tools.
    pub fn new(
        settings: Option<Settings>,
        materializer: Arc<dyn Materializer>,
        provider: Arc<dyn ToolProvider>,
    ) -> Self {
        Self {
            settings,
            materializer,
            provider,
            tools: Source::ALL.iter().map(|source| (*source, None)).collect(),
            initialized: false,
        }
    }

    /// Dispatcher wired to the dataset catalog and the configured tools.
    pub fn configured(settings: Option<Settings>, catalog: DatasetCatalog) -> Self {
        let provider = ConfiguredTools::new(settings.clone());
        Self::new(settings, Arc::new(catalog), Arc::new(provider))
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Replace the binding of one source.
    pub fn set_binding(&mut self, source: Source, binding: Option<ToolBinding>) {
        self.tools.insert(source, binding);
    }

    fn binding(&self, source: Source) -> Option<&ToolBinding> {
        self.tools.get(&source).and_then(Option::as_ref)
    }

    /// Re-materialize the datasets and rebuild every binding.
    ///
    /// Dataset and binding failures are logged and leave the affected source
    /// stale or unbound; check [`MediAide::get_status`] for what is usable.
    /// Returns `false` only when initialization panics. Takes `&mut self`, so
    /// it never overlaps a query on the same instance.
    pub fn initialize(&mut self) -> bool {
        tracing::info!("Initializing MediAide...");

        for slot in self.tools.values_mut() {
            *slot = None;
        }

        let materializer = self.materializer.clone();
        let provider = self.provider.clone();

        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            materialize_datasets(materializer.as_ref());
            bind_tools(provider.as_ref())
        }));

        match outcome {
            Ok(bindings) => {
                for (source, binding) in bindings {
                    self.tools.insert(source, Some(binding));
                }
                self.initialized = true;
                tracing::info!("MediAide initialized");
                true
            }
            Err(payload) => {
                tracing::error!(
                    "Failed to initialize MediAide: {}",
                    panic_message(payload.as_ref())
                );
                false
            }
        }
    }

    /// Ask one source.
    pub async fn query(&self, source: Source, question: &str) -> ResultRecord {
        match self.binding(source) {
            Some(binding) => invoke(source, binding, question).await,
            None => {
                tracing::debug!("No tool bound for {}", source);
                ResultRecord::unavailable(source, question)
            }
        }
    }

    /// Ask the web search source.
    pub async fn search_web(&self, question: &str) -> ResultRecord {
        self.query(Source::WebSearch, question).await
    }

    /// Ask each requested source in canonical order, one after another.
    ///
    /// An empty `sources` means all four. A failing source never prevents
    /// the others from being asked.
    pub async fn get_comprehensive_answer(
        &self,
        question: &str,
        sources: &[Source],
    ) -> AggregateResult {
        let mut responses = IndexMap::new();

        for source in Source::ALL {
            if !sources.is_empty() && !sources.contains(&source) {
                continue;
            }
            responses.insert(source, self.query(source, question).await);
        }

        AggregateResult {
            question: question.to_string(),
            sources: responses.keys().copied().collect(),
            responses,
            comprehensive: true,
        }
    }

    pub fn get_status(&self) -> StatusSnapshot {
        let bound = |source| self.binding(source).is_some();

        StatusSnapshot {
            initialized: self.initialized,
            tools: ToolsStatus {
                diabetes_db: bound(Source::Diabetes),
                cancer_db: bound(Source::Cancer),
                heart_disease_db: bound(Source::HeartDisease),
                web_search: bound(Source::WebSearch),
            },
            environment: EnvironmentStatus {
                settings_loaded: self.settings.is_some(),
                llm_configured: self
                    .settings
                    .as_ref()
                    .is_some_and(|settings| settings.llm.is_some()),
            },
        }
    }
}

fn materialize_datasets(materializer: &dyn Materializer) {
    for dataset in Dataset::ALL {
        match materializer.materialize(dataset) {
            Ok(stats) => tracing::info!(
                table = %stats.table,
                rows = stats.rows,
                "Dataset materialized"
            ),
            Err(e) => tracing::warn!("Could not materialize {} dataset: {}", dataset, e),
        }
    }
}

fn bind_tools(provider: &dyn ToolProvider) -> Vec<(Source, ToolBinding)> {
    let mut bindings = Vec::new();
    for source in Source::ALL {
        match provider.bind(source) {
            Ok(Some(binding)) => {
                tracing::info!("Bound {} tool", source);
                bindings.push((source, binding));
            }
            Ok(None) => tracing::warn!("{} tool not configured", source),
            Err(e) => tracing::warn!("Could not bind {} tool: {}", source, e),
        }
    }
    bindings
}

async fn invoke(source: Source, binding: &ToolBinding, question: &str) -> ResultRecord {
    match AssertUnwindSafe(binding.answer(question)).catch_unwind().await {
        Ok(Ok(output)) => ResultRecord::success(source, question, output),
        Ok(Err(e)) => {
            tracing::error!("Error querying {}: {}", source, e);
            ResultRecord::failure(source, question, &e.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!("Tool for {} panicked: {}", source, message);
            ResultRecord::failure(source, question, &message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "tool panicked".to_string()
    }
}
