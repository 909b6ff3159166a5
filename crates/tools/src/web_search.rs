//! Medical web search through SerpAPI.
//!
//! The tool never fails: transport, HTTP and payload errors are folded into
//! the returned text.

use crate::settings::SearchSettings;
use crate::tool::{QueryTool, ToolOutput};
use mediaide_core::{AppError, AppResult};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Option<Vec<OrganicResult>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

pub struct WebSearchTool {
    settings: SearchSettings,
    client: reqwest::Client,
}

impl WebSearchTool {
    pub fn new(settings: SearchSettings) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AppError::Search(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { settings, client })
    }

    /// Search and format the top results, or describe what went wrong.
    pub async fn search(&self, query: &str) -> String {
        match self.fetch(query).await {
            Ok(response) => format_results(query, response, self.settings.max_results),
            Err(e) => {
                tracing::warn!("Web search failed: {}", e);
                format!("Error performing search: {}", e)
            }
        }
    }

    async fn fetch(&self, query: &str) -> AppResult<SearchResponse> {
        tracing::debug!(engine = %self.settings.engine, "Searching the web: {}", query);

        let response = self
            .client
            .get(&self.settings.endpoint)
            .query(&[
                ("q", query),
                ("engine", self.settings.engine.as_str()),
                ("api_key", self.settings.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Invalid response ({}): {}", status, e)))?;

        if let Some(error) = body.error {
            return Err(AppError::Search(error));
        }
        if !status.is_success() {
            return Err(AppError::Search(format!("SerpAPI returned {}", status)));
        }

        Ok(body)
    }
}

fn format_results(query: &str, response: SearchResponse, max_results: usize) -> String {
    let Some(results) = response.organic_results else {
        return format!("No organic results found for '{}'", query);
    };

    let entries: Vec<String> = results
        .into_iter()
        .take(max_results)
        .enumerate()
        .map(|(idx, result)| {
            format!(
                "{}. {}\n   {}\n   {}",
                idx + 1,
                result.title.unwrap_or_else(|| "No title".to_string()),
                result.link.unwrap_or_else(|| "No link".to_string()),
                result.snippet.unwrap_or_else(|| "No description".to_string())
            )
        })
        .collect();

    format!("Search results for '{}':\n{}", query, entries.join("\n\n"))
}

#[async_trait::async_trait]
impl QueryTool for WebSearchTool {
    fn name(&self) -> &str {
        "medical_web_search"
    }

    async fn invoke(&self, question: &str) -> AppResult<ToolOutput> {
        Ok(ToolOutput::text(self.search(question).await))
    }
}
