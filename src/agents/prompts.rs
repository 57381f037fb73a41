// Prompt templates for LLM interactions
//
// Templates live in a YAML file with a top-level `prompts` mapping:
//
//   prompts:
//     repair_analysis:
//       content: |
//         ...
//
// The store is loaded once at startup and shared read-only between requests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Deserialize;
use tracing::Span;

use super::errors::{AgentError, AgentResult};

/// A named instruction prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub key: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct PromptFile {
    prompts: Option<serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct PromptEntry {
    #[serde(default)]
    content: Option<String>,
}

/// Read-only set of prompt templates backed by a YAML file
#[derive(Debug)]
pub struct PromptStore {
    path: PathBuf,
    templates: RwLock<HashMap<String, PromptTemplate>>,
    span: Span,
}

impl PromptStore {
    /// Load the templates from `path`
    pub fn load(path: impl AsRef<Path>) -> AgentResult<Self> {
        Self::load_with_span(path, tracing::info_span!("prompt_store"))
    }

    /// Load the templates from `path`, logging under the given span
    pub fn load_with_span(path: impl AsRef<Path>, span: Span) -> AgentResult<Self> {
        let path = path.as_ref().to_path_buf();
        let templates = read_templates(&path)?;

        tracing::info!(
            parent: &span,
            count = templates.len(),
            path = %path.display(),
            "Loaded prompt templates"
        );

        Ok(Self {
            path,
            templates: RwLock::new(templates),
            span,
        })
    }

    /// Build a store from in-memory templates (no backing file to reload)
    pub fn from_templates(templates: impl IntoIterator<Item = PromptTemplate>) -> Self {
        let templates = templates
            .into_iter()
            .map(|t| (t.key.clone(), t))
            .collect();

        Self {
            path: PathBuf::new(),
            templates: RwLock::new(templates),
            span: tracing::info_span!("prompt_store"),
        }
    }

    /// Get the content of the template named `key`
    ///
    /// Fails with `NotFound` when the key is unknown and `EmptyContent`
    /// when the template is blank.
    pub fn get(&self, key: &str) -> AgentResult<String> {
        let templates = self.templates.read().unwrap_or_else(|p| p.into_inner());

        let template = templates.get(key).ok_or_else(|| {
            tracing::error!(parent: &self.span, key, "Prompt key not found");
            AgentError::NotFound(key.to_string())
        })?;

        if template.content.trim().is_empty() {
            tracing::error!(parent: &self.span, key, "Prompt template is empty");
            return Err(AgentError::EmptyContent(key.to_string()));
        }

        tracing::debug!(
            parent: &self.span,
            key,
            chars = template.content.len(),
            "Retrieved prompt template"
        );
        Ok(template.content.clone())
    }

    /// Sorted list of available template keys
    pub fn keys(&self) -> Vec<String> {
        let templates = self.templates.read().unwrap_or_else(|p| p.into_inner());
        let mut keys: Vec<String> = templates.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Re-read the backing file. On failure the current templates are kept.
    pub fn reload(&self) -> AgentResult<usize> {
        let fresh = read_templates(&self.path).map_err(|e| {
            tracing::error!(parent: &self.span, error = %e, "Prompt reload failed");
            e
        })?;
        let count = fresh.len();

        *self.templates.write().unwrap_or_else(|p| p.into_inner()) = fresh;

        tracing::info!(parent: &self.span, count, "Reloaded prompt templates");
        Ok(count)
    }
}

fn read_templates(path: &Path) -> AgentResult<HashMap<String, PromptTemplate>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AgentError::ConfigError(format!(
            "Prompting YAML file not readable: {} ({})",
            path.display(),
            e
        ))
    })?;

    let file: PromptFile = serde_yaml::from_str(&raw).map_err(|e| {
        AgentError::ConfigError(format!("Invalid YAML in {}: {}", path.display(), e))
    })?;

    let prompts = match file.prompts {
        Some(serde_yaml::Value::Mapping(map)) => map,
        Some(_) => {
            return Err(AgentError::ConfigError(
                "Invalid YAML structure: 'prompts' is not a mapping".to_string(),
            ))
        }
        None => {
            return Err(AgentError::ConfigError(
                "Invalid YAML structure: 'prompts' key not found".to_string(),
            ))
        }
    };

    let mut templates = HashMap::with_capacity(prompts.len());
    for (key, value) in prompts {
        let key = key
            .as_str()
            .ok_or_else(|| {
                AgentError::ConfigError(format!("Prompt key is not a string: {:?}", key))
            })?
            .to_string();

        let entry: PromptEntry = serde_yaml::from_value(value).map_err(|e| {
            AgentError::ConfigError(format!("Invalid entry for prompt '{}': {}", key, e))
        })?;

        templates.insert(
            key.clone(),
            PromptTemplate {
                key,
                content: entry.content.unwrap_or_default(),
            },
        );
    }

    Ok(templates)
}
