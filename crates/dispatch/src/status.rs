//! Point-in-time view of the dispatcher's bindings and configuration.

use crate::source::Source;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolsStatus {
    pub diabetes_db: bool,
    pub cancer_db: bool,
    pub heart_disease_db: bool,
    pub web_search: bool,
}

impl ToolsStatus {
    pub fn is_bound(&self, source: Source) -> bool {
        match source {
            Source::Diabetes => self.diabetes_db,
            Source::Cancer => self.cancer_db,
            Source::HeartDisease => self.heart_disease_db,
            Source::WebSearch => self.web_search,
        }
    }

    pub fn all_bound(&self) -> bool {
        Source::ALL.iter().all(|source| self.is_bound(*source))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnvironmentStatus {
    pub settings_loaded: bool,
    pub llm_configured: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub initialized: bool,
    pub tools: ToolsStatus,
    pub environment: EnvironmentStatus,
}
