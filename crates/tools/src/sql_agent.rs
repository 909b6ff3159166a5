//! Natural-language questions answered from a dataset table.
//!
//! One round per question: describe the table, have the model write a
//! SELECT, run it read-only, then have the model phrase the rows as an
//! answer.

use crate::settings::LlmHandle;
use crate::tool::{QueryTool, ToolFactory, ToolOutput};
use mediaide_core::{AppError, AppResult};
use mediaide_datasets::{describe_table, open_read_only, run_query, split_statement, Dataset};
use mediaide_prompt::{build_prompt, load_prompt, SQL_ANSWER_PROMPT, SQL_GENERATE_PROMPT};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Rows handed back to the model when phrasing the answer.
pub const DEFAULT_MAX_ROWS: usize = 20;

/// Pull the SQL statement out of a model completion.
///
/// Accepts bare SQL, fenced code blocks and `SQLQuery:` transcripts; only the
/// first statement is kept.
pub fn extract_sql(completion: &str) -> AppResult<String> {
    let mut text = completion.trim();

    if let Some(start) = text.find("```") {
        let fenced = &text[start + 3..];
        let fenced = fenced
            .strip_prefix("sqlite")
            .or_else(|| fenced.strip_prefix("sql"))
            .or_else(|| fenced.strip_prefix("SQL"))
            .unwrap_or(fenced);
        text = match fenced.find("```") {
            Some(end) => &fenced[..end],
            None => fenced,
        };
    }

    if let Some(idx) = text.find("SQLQuery:") {
        text = &text[idx + "SQLQuery:".len()..];
    }
    if let Some(idx) = text.find("SQLResult:") {
        text = &text[..idx];
    }

    let statement = split_statement(text).0.trim();
    if statement.is_empty() {
        return Err(AppError::Llm(
            "Model response did not contain a SQL query".to_string(),
        ));
    }

    Ok(statement.to_string())
}

/// SQL agent bound to one dataset database.
pub struct SqlAgent {
    dataset: Dataset,
    database: PathBuf,
    workspace: PathBuf,
    llm: LlmHandle,
    max_rows: usize,
    name: String,
}

impl SqlAgent {
    pub fn new(
        dataset: Dataset,
        database: impl Into<PathBuf>,
        workspace: impl Into<PathBuf>,
        llm: LlmHandle,
    ) -> Self {
        Self {
            dataset,
            database: database.into(),
            workspace: workspace.into(),
            llm,
            max_rows: DEFAULT_MAX_ROWS,
            name: format!("{}_sql_agent", dataset.table_name()),
        }
    }

    async fn generate_sql(&self, question: &str) -> AppResult<String> {
        let definition = load_prompt(&self.workspace, SQL_GENERATE_PROMPT)?;

        // Connection is not Sync: keep it out of the awaited section
        let schema = {
            let conn = open_read_only(&self.database)?;
            describe_table(&conn, self.dataset.table_name(), definition.context.sample_rows)?
        };

        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("dataset".to_string(), self.dataset.display_name().to_string());
        variables.insert("maxRows".to_string(), self.max_rows.to_string());

        let prompt = build_prompt(&definition, variables, Some(schema.to_prompt_context()))?;
        let completion = self.llm.complete(&prompt).await?;
        extract_sql(&completion)
    }

    async fn phrase_answer(&self, question: &str, sql: &str, result: &str) -> AppResult<String> {
        let definition = load_prompt(&self.workspace, SQL_ANSWER_PROMPT)?;

        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("dataset".to_string(), self.dataset.display_name().to_string());
        variables.insert("sql".to_string(), sql.to_string());
        variables.insert("result".to_string(), result.to_string());

        let prompt = build_prompt(&definition, variables, None)?;
        self.llm.complete(&prompt).await
    }
}

#[async_trait::async_trait]
impl QueryTool for SqlAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, question: &str) -> AppResult<ToolOutput> {
        tracing::info!(dataset = %self.dataset, "Answering: {}", question);

        let sql = self.generate_sql(question).await?;
        tracing::debug!(dataset = %self.dataset, "Generated SQL: {}", sql);

        let result = {
            let conn = open_read_only(&self.database)?;
            run_query(&conn, &sql, self.max_rows)?
        };

        let answer = self.phrase_answer(question, &sql, &result.to_text()).await?;

        Ok(ToolOutput::text(answer).with_sql(sql))
    }
}

/// Builds a fresh [`SqlAgent`] for every question.
pub struct SqlAgentFactory {
    dataset: Dataset,
    database: PathBuf,
    workspace: PathBuf,
    llm: LlmHandle,
}

impl SqlAgentFactory {
    pub fn new(
        dataset: Dataset,
        database: impl Into<PathBuf>,
        workspace: impl Into<PathBuf>,
        llm: LlmHandle,
    ) -> Self {
        Self {
            dataset,
            database: database.into(),
            workspace: workspace.into(),
            llm,
        }
    }
}

impl ToolFactory for SqlAgentFactory {
    fn build(&self) -> AppResult<Arc<dyn QueryTool>> {
        if !self.database.exists() {
            return Err(AppError::Tool(format!(
                "{} database not found at {:?}; run `mediaide load` first",
                self.dataset.display_name(),
                self.database
            )));
        }

        Ok(Arc::new(SqlAgent::new(
            self.dataset,
            self.database.clone(),
            self.workspace.clone(),
            self.llm.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedLlm;
    use mediaide_datasets::materialize_csv;
    use std::path::Path;
    use tempfile::TempDir;

    const CANCER_CSV: &str = "\
Age,Gender,BMI,Smoking,Diagnosis
58,1,16.08,0,1
71,0,30.83,0,0
48,1,38.78,0,1
34,0,35.82,1,0
";

    fn cancer_db(dir: &Path) -> PathBuf {
        let csv = dir.join("cancer.csv");
        std::fs::write(&csv, CANCER_CSV).unwrap();
        let db = dir.join("db/cancer.db");
        materialize_csv(&csv, &db, "cancer").unwrap();
        db
    }

    #[test]
    fn test_extract_sql_variants() {
        assert_eq!(
            extract_sql("SELECT COUNT(*) FROM cancer;").unwrap(),
            "SELECT COUNT(*) FROM cancer"
        );
        assert_eq!(
            extract_sql("Here you go:\n```sql\nSELECT AVG(BMI) FROM cancer;\n```\nDone.").unwrap(),
            "SELECT AVG(BMI) FROM cancer"
        );
        assert_eq!(
            extract_sql("SQLQuery: SELECT Age FROM cancer\nSQLResult: 58").unwrap(),
            "SELECT Age FROM cancer"
        );
        assert_eq!(
            extract_sql("SELECT COUNT(*) FROM cancer WHERE Note = 'a;b';\nSELECT 2;").unwrap(),
            "SELECT COUNT(*) FROM cancer WHERE Note = 'a;b'"
        );
        assert_eq!(
            extract_sql("SELECT 1; SELECT 2;").unwrap(),
            "SELECT 1"
        );
        assert!(extract_sql("```\n```").is_err());
    }

    #[tokio::test]
    async fn test_agent_answers_from_table() {
        let temp_dir = TempDir::new().unwrap();
        let db = cancer_db(temp_dir.path());
        let llm = ScriptedLlm::new([
            "```sql\nSELECT COUNT(*) AS total FROM cancer WHERE Diagnosis = 1;\n```",
            "Two patients in the cancer dataset have a positive diagnosis.",
        ]);

        let agent = SqlAgent::new(
            Dataset::Cancer,
            db,
            temp_dir.path(),
            LlmHandle::new(llm.clone(), "test-model"),
        );

        let output = agent.invoke("How many patients have cancer?").await.unwrap();
        assert_eq!(
            output.output,
            "Two patients in the cancer dataset have a positive diagnosis."
        );
        assert_eq!(
            output.sql.as_deref(),
            Some("SELECT COUNT(*) AS total FROM cancer WHERE Diagnosis = 1")
        );

        let requests = llm.requests();
        assert_eq!(requests.len(), 2);
        // Schema and sample rows reach the SQL prompt
        assert!(requests[0].prompt.contains("CREATE TABLE \"cancer\""));
        assert!(requests[0].prompt.contains("How many patients have cancer?"));
        // Query result reaches the answer prompt
        assert!(requests[1].prompt.contains("total\n2"));
    }

    #[tokio::test]
    async fn test_agent_rejects_writes() {
        let temp_dir = TempDir::new().unwrap();
        let db = cancer_db(temp_dir.path());
        let llm = ScriptedLlm::new(["DELETE FROM cancer"]);

        let agent = SqlAgent::new(Dataset::Cancer, &db, temp_dir.path(), LlmHandle::new(llm, "m"));
        let err = agent.invoke("Remove everything").await.unwrap_err();
        assert!(matches!(err, AppError::Sql(_)));

        assert_eq!(row_count(&db), 4);
    }

    fn row_count(db: &Path) -> i64 {
        let conn = open_read_only(db).unwrap();
        run_query(&conn, "SELECT COUNT(*) FROM cancer", 1).unwrap().rows[0][0]
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn test_agent_propagates_model_failure() {
        let temp_dir = TempDir::new().unwrap();
        let db = cancer_db(temp_dir.path());
        let agent = SqlAgent::new(
            Dataset::Cancer,
            db,
            temp_dir.path(),
            LlmHandle::new(ScriptedLlm::new(Vec::<String>::new()), "m"),
        );

        let err = agent.invoke("Anything").await.unwrap_err();
        assert!(err.to_string().contains("No scripted response left"));
    }

    #[test]
    fn test_factory_requires_database() {
        let temp_dir = TempDir::new().unwrap();
        let factory = SqlAgentFactory::new(
            Dataset::Diabetes,
            temp_dir.path().join("diabetes.db"),
            temp_dir.path(),
            LlmHandle::new(ScriptedLlm::new(Vec::<String>::new()), "m"),
        );

        match factory.build() {
            Err(err) => assert!(err.to_string().contains("mediaide load")),
            Ok(_) => panic!("Expected missing database error"),
        }
    }

    #[test]
    fn test_factory_builds_agent() {
        let temp_dir = TempDir::new().unwrap();
        let db = cancer_db(temp_dir.path());
        let factory = SqlAgentFactory::new(
            Dataset::Cancer,
            db,
            temp_dir.path(),
            LlmHandle::new(ScriptedLlm::new(Vec::<String>::new()), "m"),
        );

        let tool = factory.build().unwrap();
        assert_eq!(tool.name(), "cancer_sql_agent");
    }
}
