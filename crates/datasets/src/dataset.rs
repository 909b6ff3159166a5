//! The three fixed disease datasets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A tabular dataset backed by one CSV file and one SQLite table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Diabetes,
    Cancer,
    HeartDisease,
}

impl Dataset {
    /// Every dataset, in materialization order.
    pub const ALL: [Dataset; 3] = [Dataset::Diabetes, Dataset::Cancer, Dataset::HeartDisease];

    /// Name of the SQLite table the CSV is loaded into.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes",
            Self::Cancer => "cancer",
            Self::HeartDisease => "heart_disease",
        }
    }

    /// CSV file name looked up in the data directory unless overridden.
    pub fn default_file(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes.csv",
            Self::Cancer => "The_Cancer_data_1500_V2.csv",
            Self::HeartDisease => "heart.csv",
        }
    }

    /// File name of the generated SQLite database.
    pub fn database_file(&self) -> String {
        format!("{}.db", self.table_name())
    }

    /// Human-readable name used in prompts and messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes",
            Self::Cancer => "cancer",
            Self::HeartDisease => "heart disease",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(Dataset::HeartDisease.table_name(), "heart_disease");
        assert_eq!(Dataset::HeartDisease.database_file(), "heart_disease.db");
        assert_eq!(Dataset::Cancer.default_file(), "The_Cancer_data_1500_V2.csv");
        assert_eq!(Dataset::HeartDisease.display_name(), "heart disease");
    }
}
