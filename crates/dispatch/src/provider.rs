//! Where tool bindings come from.

use crate::source::Source;
use mediaide_core::AppResult;
use mediaide_tools::{SearchSettings, Settings, SqlAgentFactory, ToolBinding, WebSearchTool};

/// Produces the binding for a source during initialization.
///
/// `Ok(None)` means the source is not configured; errors are logged by the
/// dispatcher and leave the source unbound.
pub trait ToolProvider: Send + Sync {
    fn bind(&self, source: Source) -> AppResult<Option<ToolBinding>>;
}

/// Bindings derived from [`Settings`].
///
/// Dataset sources get a SQL agent factory when a language model is
/// configured; web search gets a SerpAPI tool when a search key is set.
/// Search credentials are kept apart from the rest of the settings so web
/// search stays available when the settings themselves failed to load.
#[derive(Debug, Clone)]
pub struct ConfiguredTools {
    settings: Option<Settings>,
    search: Option<SearchSettings>,
}

impl ConfiguredTools {
    pub fn new(settings: Option<Settings>) -> Self {
        let search = settings.as_ref().and_then(|s| s.search.clone());
        Self { settings, search }
    }

    /// Fall back to `search` when the settings carry no search credentials.
    pub fn with_search(mut self, search: Option<SearchSettings>) -> Self {
        if self.search.is_none() {
            self.search = search;
        }
        self
    }
}

impl ToolProvider for ConfiguredTools {
    fn bind(&self, source: Source) -> AppResult<Option<ToolBinding>> {
        let Some(dataset) = source.dataset() else {
            return self
                .search
                .clone()
                .map(|search| WebSearchTool::new(search).map(ToolBinding::direct))
                .transpose();
        };

        let Some(settings) = &self.settings else {
            return Ok(None);
        };

        Ok(settings.llm.as_ref().map(|llm| {
            ToolBinding::factory(SqlAgentFactory::new(
                dataset,
                settings.database_dir.join(dataset.database_file()),
                settings.workspace.clone(),
                llm.clone(),
            ))
        }))
    }
}
