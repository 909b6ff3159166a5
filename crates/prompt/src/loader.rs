//! Prompt loader for YAML prompt definitions.
//!
//! Built-in definitions ship inside the binary. A file named `<id>.yml` in
//! the workspace's `.mediaide/prompts/` directory replaces the built-in with
//! the same id.

use crate::types::PromptDefinition;
use mediaide_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Question + schema → one SQLite SELECT.
pub const SQL_GENERATE_PROMPT: &str = "medical.sql.generate";

/// Question + SQL + rows → prose answer.
pub const SQL_ANSWER_PROMPT: &str = "medical.sql.answer";

const BUILTIN_PROMPTS: [(&str, &str); 2] = [
    (
        SQL_GENERATE_PROMPT,
        include_str!("../prompts/medical.sql.generate.yml"),
    ),
    (
        SQL_ANSWER_PROMPT,
        include_str!("../prompts/medical.sql.answer.yml"),
    ),
];

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".mediaide/prompts")
}

/// Load a prompt definition by ID.
///
/// # Example
/// ```no_run
/// use mediaide_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "medical.sql.generate")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    let (contents, origin) = if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);
        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;
        (contents, format!("{:?}", prompt_file))
    } else if let Some(builtin) = builtin_prompt(prompt_id) {
        (builtin.to_string(), "built-in".to_string())
    } else {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' not found (no built-in and no file at {:?})",
            prompt_id, prompt_file
        )));
    };

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e))
    })?;

    validate_prompt(&definition)?;

    tracing::debug!(
        "Loaded prompt: {} ({}) from {}",
        definition.id,
        definition.title,
        origin
    );

    Ok(definition)
}

fn builtin_prompt(prompt_id: &str) -> Option<&'static str> {
    BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .map(|(_, yaml)| *yaml)
}

/// List all available prompt IDs: built-ins plus workspace overrides, sorted.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let mut prompt_ids: Vec<String> = BUILTIN_PROMPTS
        .iter()
        .map(|(id, _)| id.to_string())
        .collect();

    let dir = prompts_dir(workspace_path);
    if dir.exists() {
        for entry in walkdir::WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    prompt_ids.push(stem.to_string());
                }
            }
        }
    }

    prompt_ids.sort();
    prompt_ids.dedup();
    Ok(prompt_ids)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_override(dir: &Path, id: &str, valid: bool) -> PathBuf {
        let prompts_dir = dir.join(".mediaide/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();

        let content = if valid {
            format!(
                r#"
id: {}
title: "Override"
apiVersion: "1.1"
createdBy: test
behavior:
  tone: terse
  style: concise
template: "Q: {{{{question}}}}"
output:
  format: text
"#,
                id
            )
        } else {
            "invalid: yaml: content:".to_string()
        };

        let file_path = prompts_dir.join(format!("{}.yml", id));
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn test_builtin_prompts_parse_and_validate() {
        let temp_dir = TempDir::new().unwrap();
        for (id, _) in BUILTIN_PROMPTS {
            let prompt = load_prompt(temp_dir.path(), id).unwrap();
            assert_eq!(prompt.id, id);
        }

        let generate = load_prompt(temp_dir.path(), SQL_GENERATE_PROMPT).unwrap();
        assert!(generate.context.include_schema);
        assert!(generate.system.is_some());
    }

    #[test]
    fn test_workspace_override_wins() {
        let temp_dir = TempDir::new().unwrap();
        write_override(temp_dir.path(), SQL_ANSWER_PROMPT, true);

        let prompt = load_prompt(temp_dir.path(), SQL_ANSWER_PROMPT).unwrap();
        assert_eq!(prompt.title, "Override");
        assert_eq!(prompt.template, "Q: {{question}}");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_prompt(temp_dir.path(), "nonexistent");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_override(temp_dir.path(), "invalid", false);

        let result = load_prompt(temp_dir.path(), "invalid");
        assert!(result.is_err());
    }

    #[test]
    fn test_list_prompts() {
        let temp_dir = TempDir::new().unwrap();
        write_override(temp_dir.path(), "custom.summary", true);
        write_override(temp_dir.path(), SQL_ANSWER_PROMPT, true);

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(
            prompts,
            vec![
                "custom.summary".to_string(),
                SQL_ANSWER_PROMPT.to_string(),
                SQL_GENERATE_PROMPT.to_string(),
            ]
        );
    }
}
