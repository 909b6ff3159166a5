//! Prompt builder for rendering templates and injecting table context.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use mediaide_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// When the definition asks for it and `schema_context` is given, the table
/// description is exposed to the template as `{{schema}}`. Both the system
/// message and the user template are rendered with the same variables.
///
/// # Example
/// ```no_run
/// use mediaide_prompt::{build_prompt, PromptDefinition};
/// use std::collections::HashMap;
///
/// # fn example(def: PromptDefinition) -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "How many patients are over 60?".to_string());
///
/// let built = build_prompt(&def, vars, Some("CREATE TABLE diabetes (...)".to_string()))?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    mut variables: HashMap<String, String>,
    schema_context: Option<String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let schema_included = if definition.context.include_schema {
        match schema_context {
            Some(schema) => {
                variables.insert("schema".to_string(), schema);
                true
            }
            None => {
                tracing::warn!(
                    "Prompt '{}' wants a table schema but none was provided",
                    definition.id
                );
                false
            }
        }
    } else {
        false
    };

    let renderer = renderer();

    let user = render_template(&renderer, &definition.template, &variables)?;
    let system = definition
        .system
        .as_deref()
        .map(|system| render_template(&renderer, system, &variables))
        .transpose()?
        .map(|system| system.trim().to_string())
        .filter(|system| !system.is_empty());

    Ok(BuiltPrompt::new(
        system,
        user,
        definition.id.clone(),
        schema_included,
        variables,
    ))
}

fn renderer() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    // Plain text prompts: no HTML escaping of SQL or table rows
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
}

/// Render a Handlebars template with variables.
fn render_template(
    handlebars: &Handlebars<'_>,
    template: &str,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    handlebars
        .render_template(template, variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
