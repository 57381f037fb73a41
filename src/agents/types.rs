use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{AgentError, AgentResult};

/// A single call to the completion service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model_id: String,
    pub max_tokens: u32,
    pub combined_prompt: String,
}

/// Messages API request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl From<&CompletionRequest> for MessagesRequest {
    fn from(req: &CompletionRequest) -> Self {
        Self {
            model: req.model_id.clone(),
            max_tokens: req.max_tokens,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: req.combined_prompt.clone(),
            }],
        }
    }
}

/// Messages API response body. Only `content` is relied upon; its items are
/// kept loose so an unexpected block shape surfaces as a malformed response
/// instead of a decode failure of the whole payload.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Option<Vec<Value>>,
}

/// Triage complexity reported by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

impl ComplexityLevel {
    /// Case-insensitive parse of "low" / "medium" / "high"
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "low" => Some(ComplexityLevel::Low),
            "medium" => Some(ComplexityLevel::Medium),
            "high" => Some(ComplexityLevel::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplexityLevel::Low => write!(f, "low"),
            ComplexityLevel::Medium => write!(f, "medium"),
            ComplexityLevel::High => write!(f, "high"),
        }
    }
}

/// Structured repair triage returned by the model
///
/// Only constructed through [`AnalysisResult::from_value`], so every
/// instance has passed validation of the required fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub parts_needed: bool,
    pub complexity_level: ComplexityLevel,
    pub further_inquiry: bool,
    pub further_questions: Option<String>,
    pub instructions: Option<String>,
    pub description_of_issue: Option<String>,
}

const REQUIRED_FIELDS: [&str; 3] = ["parts_needed", "complexity_level", "further_inquiry"];

impl AnalysisResult {
    /// Validate a parsed model reply
    ///
    /// # Rules
    /// - `parts_needed`, `complexity_level`, `further_inquiry` must be present
    /// - the two flags must be booleans (or the strings "true"/"false")
    /// - `complexity_level` must be low, medium or high, in any case
    /// - optional text fields that are missing or not strings count as absent
    pub fn from_value(value: &Value) -> AgentResult<Self> {
        let obj = value.as_object().ok_or_else(|| {
            AgentError::ValidationError("model response is not a JSON object".to_string())
        })?;

        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| obj.get(*field).map_or(true, Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(AgentError::ValidationError(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let parts_needed = flag(obj, "parts_needed")?;
        let further_inquiry = flag(obj, "further_inquiry")?;

        let complexity_level = obj
            .get("complexity_level")
            .and_then(Value::as_str)
            .and_then(ComplexityLevel::parse)
            .ok_or_else(|| {
                AgentError::ValidationError(format!(
                    "invalid complexity_level: {}",
                    obj["complexity_level"]
                ))
            })?;

        Ok(Self {
            parts_needed,
            complexity_level,
            further_inquiry,
            further_questions: text(obj, "further_questions"),
            instructions: text(obj, "instructions"),
            description_of_issue: text(obj, "description_of_issue"),
        })
    }
}

fn flag(obj: &serde_json::Map<String, Value>, field: &str) -> AgentResult<bool> {
    match obj.get(field) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
        Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
        other => Err(AgentError::ValidationError(format!(
            "field {} has wrong type: expected boolean, got {}",
            field,
            other.map_or_else(|| "nothing".to_string(), Value::to_string)
        ))),
    }
}

fn text(obj: &serde_json::Map<String, Value>, field: &str) -> Option<String> {
    obj.get(field).and_then(Value::as_str).map(str::to_string)
}
