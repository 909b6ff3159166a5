//! Query tool abstraction.
//!
//! A source is answered either by a ready tool or by a factory that builds a
//! fresh tool for every question. [`ToolBinding`] hides the difference.

use mediaide_core::AppResult;
use std::fmt;
use std::sync::Arc;

/// What a tool produced for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Answer text, passed through unchanged
    pub output: String,

    /// SQL the tool executed, if any
    pub sql: Option<String>,
}

impl ToolOutput {
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            sql: None,
        }
    }

    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }
}

/// Answers free-text questions for one source.
#[async_trait::async_trait]
pub trait QueryTool: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Answer `question`.
    async fn invoke(&self, question: &str) -> AppResult<ToolOutput>;
}

/// Builds a [`QueryTool`] on demand.
pub trait ToolFactory: Send + Sync {
    fn build(&self) -> AppResult<Arc<dyn QueryTool>>;
}

/// The callable bound to a source.
#[derive(Clone)]
pub enum ToolBinding {
    Direct(Arc<dyn QueryTool>),
    Factory(Arc<dyn ToolFactory>),
}

impl ToolBinding {
    pub fn direct(tool: impl QueryTool + 'static) -> Self {
        Self::Direct(Arc::new(tool))
    }

    pub fn factory(factory: impl ToolFactory + 'static) -> Self {
        Self::Factory(Arc::new(factory))
    }

    /// Answer `question`, building the tool first when bound to a factory.
    pub async fn answer(&self, question: &str) -> AppResult<ToolOutput> {
        match self {
            Self::Direct(tool) => tool.invoke(question).await,
            Self::Factory(factory) => {
                let tool = factory.build()?;
                tracing::debug!("Built tool '{}'", tool.name());
                tool.invoke(question).await
            }
        }
    }
}

impl fmt::Debug for ToolBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(tool) => f.debug_tuple("Direct").field(&tool.name()).finish(),
            Self::Factory(_) => f.write_str("Factory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediaide_core::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo;

    #[async_trait::async_trait]
    impl QueryTool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn invoke(&self, question: &str) -> AppResult<ToolOutput> {
            Ok(ToolOutput::text(question))
        }
    }

    struct CountingFactory {
        built: Arc<AtomicUsize>,
        fail: bool,
    }

    impl ToolFactory for CountingFactory {
        fn build(&self) -> AppResult<Arc<dyn QueryTool>> {
            if self.fail {
                return Err(AppError::Tool("database missing".to_string()));
            }
            self.built.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Echo))
        }
    }

    #[tokio::test]
    async fn test_direct_binding() {
        let binding = ToolBinding::direct(Echo);
        let output = binding.answer("How many rows?").await.unwrap();
        assert_eq!(output, ToolOutput::text("How many rows?"));
    }

    #[tokio::test]
    async fn test_factory_builds_per_question() {
        let built = Arc::new(AtomicUsize::new(0));
        let binding = ToolBinding::factory(CountingFactory {
            built: built.clone(),
            fail: false,
        });

        binding.answer("one").await.unwrap();
        let output = binding.answer("two").await.unwrap();

        assert_eq!(output.output, "two");
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_factory_error_propagates() {
        let binding = ToolBinding::factory(CountingFactory {
            built: Arc::new(AtomicUsize::new(0)),
            fail: true,
        });

        let err = binding.answer("q").await.unwrap_err();
        assert!(err.to_string().contains("database missing"));
    }
}
