//! Uniform result shapes returned by the dispatcher.

use crate::source::Source;
use indexmap::IndexMap;
use mediaide_tools::ToolOutput;
use serde::Serialize;

/// `source` value of every failed result.
pub const ERROR_SOURCE: &str = "error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultMetadata {
    pub tool_used: String,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

/// Outcome of one single-source query.
///
/// Only built through [`ResultRecord::success`], [`ResultRecord::failure`] and
/// [`ResultRecord::unavailable`], so `success` is false exactly when `source`
/// is `"error"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    answer: String,
    source: String,
    success: bool,
    metadata: ResultMetadata,
}

impl ResultRecord {
    /// The tool answered; its text is kept verbatim.
    pub fn success(source: Source, question: &str, output: ToolOutput) -> Self {
        Self {
            answer: output.output,
            source: source.tag().to_string(),
            success: true,
            metadata: ResultMetadata {
                tool_used: source.tool_used().to_string(),
                question: question.to_string(),
                sql: output.sql,
            },
        }
    }

    /// The bound tool failed with `error`.
    pub fn failure(source: Source, question: &str, error: &str) -> Self {
        Self::error(source, question, source.failure_message(error))
    }

    /// No tool is bound for `source`.
    pub fn unavailable(source: Source, question: &str) -> Self {
        Self::error(source, question, source.unavailable_message())
    }

    fn error(source: Source, question: &str, answer: String) -> Self {
        Self {
            answer,
            source: ERROR_SOURCE.to_string(),
            success: false,
            metadata: ResultMetadata {
                tool_used: source.tool_used().to_string(),
                question: question.to_string(),
                sql: None,
            },
        }
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn metadata(&self) -> &ResultMetadata {
        &self.metadata
    }
}

/// Results of one question fanned out to several sources.
///
/// Always returned, even when every entry failed; inspect each record.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    pub question: String,
    /// Keyed by source, in canonical order
    pub responses: IndexMap<Source, ResultRecord>,
    pub comprehensive: bool,
    pub sources: Vec<Source>,
}
