//! Dispatcher behavior tests and their shared stubs.


use crate::provider::ToolProvider;
use crate::source::Source;
use mediaide_core::{AppError, AppResult};
use mediaide_datasets::{Dataset, LoadStats, Materializer};
use mediaide_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use mediaide_tools::{QueryTool, ToolBinding, ToolOutput};
use std::path::PathBuf;
use std::sync::Mutex;

/// Language model that answers every prompt with "stub".
pub(crate) struct StubLlm;

#[async_trait::async_trait]
impl LlmClient for StubLlm {
    fn provider_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        Ok(LlmResponse {
            content: "stub".to_string(),
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

/// What a [`StubTool`] does when invoked.
#[derive(Clone)]
pub(crate) enum Behavior {
    Reply(String),
    Fail(String),
    Panic(String),
}

pub(crate) struct StubTool {
    behavior: Behavior,
    calls: Mutex<Vec<String>>,
}

impl StubTool {
    pub(crate) fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl QueryTool for StubTool {
    fn name(&self) -> &str {
        "stub"
    }

    async fn invoke(&self, question: &str) -> AppResult<ToolOutput> {
        self.calls.lock().unwrap().push(question.to_string());
        match &self.behavior {
            Behavior::Reply(text) => Ok(ToolOutput::text(text.clone())),
            Behavior::Fail(message) => Err(AppError::Tool(message.clone())),
            Behavior::Panic(message) => panic!("{}", message),
        }
    }
}

pub(crate) fn reply(text: &str) -> Option<ToolBinding> {
    Some(ToolBinding::direct(StubTool::new(Behavior::Reply(text.to_string()))))
}

pub(crate) fn fail(message: &str) -> Option<ToolBinding> {
    Some(ToolBinding::direct(StubTool::new(Behavior::Fail(message.to_string()))))
}

pub(crate) fn panics(message: &str) -> Option<ToolBinding> {
    Some(ToolBinding::direct(StubTool::new(Behavior::Panic(message.to_string()))))
}

/// Records every dataset it is asked to materialize; fails or panics on
/// request.
#[derive(Default)]
pub(crate) struct StubMaterializer {
    pub(crate) fail_on: Option<Dataset>,
    pub(crate) panic: bool,
    pub(crate) calls: Mutex<Vec<Dataset>>,
}

impl Materializer for StubMaterializer {
    fn materialize(&self, dataset: Dataset) -> AppResult<LoadStats> {
        self.calls.lock().unwrap().push(dataset);
        if self.panic {
            panic!("materializer exploded");
        }
        if self.fail_on == Some(dataset) {
            return Err(AppError::Dataset(format!("{} CSV missing", dataset)));
        }
        Ok(LoadStats {
            table: dataset.table_name().to_string(),
            rows: 1,
            columns: 1,
            database: PathBuf::from(dataset.database_file()),
        })
    }
}

/// Binds a replying stub for every source except those listed as missing
/// or broken.
#[derive(Default)]
pub(crate) struct StubProvider {
    pub(crate) missing: Vec<Source>,
    pub(crate) broken: Vec<Source>,
}

impl ToolProvider for StubProvider {
    fn bind(&self, source: Source) -> AppResult<Option<ToolBinding>> {
        if self.broken.contains(&source) {
            return Err(AppError::Tool(format!("cannot build {} tool", source)));
        }
        if self.missing.contains(&source) {
            return Ok(None);
        }
        Ok(reply(&format!("{} answer", source.key())))
    }
}
