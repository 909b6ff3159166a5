//! The four answer sources.

use mediaide_core::AppError;
use mediaide_datasets::Dataset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Diabetes,
    Cancer,
    HeartDisease,
    WebSearch,
}

impl Source {
    /// Canonical order used by the aggregate query.
    pub const ALL: [Source; 4] = [
        Source::Diabetes,
        Source::Cancer,
        Source::HeartDisease,
        Source::WebSearch,
    ];

    /// Key used in aggregate responses.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes",
            Self::Cancer => "cancer",
            Self::HeartDisease => "heart_disease",
            Self::WebSearch => "web_search",
        }
    }

    /// `source` tag of a successful result.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes_database",
            Self::Cancer => "cancer_database",
            Self::HeartDisease => "heart_disease_database",
            Self::WebSearch => "web_search",
        }
    }

    /// `metadata.tool_used` of a result.
    pub fn tool_used(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes_db_agent",
            Self::Cancer => "cancer_db_agent",
            Self::HeartDisease => "heart_disease_db_agent",
            Self::WebSearch => "medical_web_search",
        }
    }

    /// Backing dataset, `None` for web search.
    pub fn dataset(&self) -> Option<Dataset> {
        match self {
            Self::Diabetes => Some(Dataset::Diabetes),
            Self::Cancer => Some(Dataset::Cancer),
            Self::HeartDisease => Some(Dataset::HeartDisease),
            Self::WebSearch => None,
        }
    }

    pub fn unavailable_message(&self) -> String {
        match self {
            Self::Diabetes => {
                "Diabetes database tool not available. Please check your configuration.".to_string()
            }
            Self::Cancer => {
                "Cancer database tool not available. Please check your configuration.".to_string()
            }
            Self::HeartDisease => {
                "Heart disease database tool not available. Please check your configuration."
                    .to_string()
            }
            Self::WebSearch => {
                "Web search tool not available. Please check your configuration.".to_string()
            }
        }
    }

    pub fn failure_message(&self, error: &str) -> String {
        match self.dataset() {
            Some(dataset) => format!(
                "Error occurred while querying {} database: {}",
                dataset.display_name(),
                error
            ),
            None => format!("Error occurred while searching the web: {}", error),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Source {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diabetes" => Ok(Self::Diabetes),
            "cancer" => Ok(Self::Cancer),
            "heart" | "heart_disease" | "heart-disease" => Ok(Self::HeartDisease),
            "web" | "search" | "web_search" => Ok(Self::WebSearch),
            other => Err(AppError::Other(format!(
                "Unknown source '{}'. Expected one of: diabetes, cancer, heart, web",
                other
            ))),
        }
    }
}
