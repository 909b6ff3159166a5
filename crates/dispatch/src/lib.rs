//! Question dispatch for MediAide.
//!
//! [`MediAide`] owns one optional tool binding per [`Source`] and exposes a
//! uniform query per source plus an aggregate query across sources.

pub mod dispatcher;
pub mod provider;
pub mod record;
pub mod source;
pub mod status;

#[cfg(test)]
mod tests;

pub use dispatcher::MediAide;
pub use provider::{ConfiguredTools, ToolProvider};
pub use record::{AggregateResult, ResultMetadata, ResultRecord, ERROR_SOURCE};
pub use source::Source;
pub use status::{EnvironmentStatus, StatusSnapshot, ToolsStatus};
