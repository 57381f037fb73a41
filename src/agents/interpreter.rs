// Turns a model reply into the single message shown to the customer
//
// Input is untrusted text generated by the model. Every path ends in a
// non-empty message; failures are rendered as fixed sentences rather than
// propagated.
//
//   Unavailable ─────────────────────────────────────────► NO_RESPONSE
//   Text ── blank ───────────────────────────────────────► NO_RESPONSE
//        ── not JSON ────────────────────────────────────► text verbatim
//        ── any JSON ────┐
//   Structured ──────────┴─ validate ── invalid ─────────► diagnostic
//                                   └── AnalysisResult ──► decision table

use serde_json::Value;
use tracing::Span;

use super::errors::{AgentError, AgentResult};
use super::types::{AnalysisResult, ComplexityLevel};

pub const CONTRACTOR_DISPATCH: &str = "It seems your issue is rather complex, \
    would you like for me to dispatch a contractor to your address?";
pub const QUESTIONS_MISSING: &str =
    "I need more information to help you, but no specific questions were provided.";
pub const INSTRUCTIONS_MISSING: &str =
    "I should provide repair instructions, but none were generated.";
pub const NO_RESPONSE: &str =
    "Sorry, no response was available from the repair assistant. Please try again later.";

/// What the interpreter was handed
#[derive(Debug)]
pub enum ModelOutput {
    /// No model answer was obtained
    Unavailable(AgentError),
    /// Raw reply text, possibly JSON
    Text(String),
    /// Reply that is already parsed
    Structured(Value),
}

/// Next step chosen for a validated analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    DispatchContractor,
    AskQuestions(Option<String>),
    GiveInstructions(Option<String>),
}

impl Decision {
    /// Decision table, first match wins:
    /// 1. parts needed or high complexity -> contractor
    /// 2. low/medium and further inquiry -> questions
    /// 3. low/medium and no further inquiry -> instructions
    pub fn for_analysis(analysis: &AnalysisResult) -> Self {
        match (analysis.parts_needed, analysis.complexity_level, analysis.further_inquiry) {
            (true, _, _) | (_, ComplexityLevel::High, _) => Decision::DispatchContractor,
            (false, ComplexityLevel::Low | ComplexityLevel::Medium, true) => {
                Decision::AskQuestions(non_blank(&analysis.further_questions))
            }
            (false, ComplexityLevel::Low | ComplexityLevel::Medium, false) => {
                Decision::GiveInstructions(non_blank(&analysis.instructions))
            }
        }
    }

    pub fn into_message(self) -> String {
        match self {
            Decision::DispatchContractor => CONTRACTOR_DISPATCH.to_string(),
            Decision::AskQuestions(Some(questions)) => questions,
            Decision::AskQuestions(None) => QUESTIONS_MISSING.to_string(),
            Decision::GiveInstructions(Some(instructions)) => instructions,
            Decision::GiveInstructions(None) => INSTRUCTIONS_MISSING.to_string(),
        }
    }
}

fn non_blank(text: &Option<String>) -> Option<String> {
    text.as_ref().filter(|t| !t.trim().is_empty()).cloned()
}

/// Stateless; the same input always yields the same message
pub struct ResponseInterpreter {
    span: Span,
}

impl Default for ResponseInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseInterpreter {
    pub fn new() -> Self {
        Self {
            span: tracing::info_span!("response_interpreter"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Produce the customer-facing message for any model output
    pub fn interpret(&self, output: ModelOutput) -> String {
        let result = match output {
            ModelOutput::Unavailable(e) => {
                tracing::warn!(
                    parent: &self.span,
                    kind = e.kind(),
                    error = %e,
                    "No model response available"
                );
                Ok(NO_RESPONSE.to_string())
            }
            ModelOutput::Text(text) => self.interpret_text(text),
            ModelOutput::Structured(value) => self.interpret_value(&value),
        };

        result.unwrap_or_else(|e| {
            tracing::error!(
                parent: &self.span,
                kind = e.kind(),
                error = %e,
                "Error processing repair analysis"
            );
            diagnostic(&e)
        })
    }

    /// Apply the decision table to an already validated analysis
    pub fn interpret_analysis(&self, analysis: &AnalysisResult) -> String {
        tracing::info!(
            parent: &self.span,
            parts_needed = analysis.parts_needed,
            complexity = %analysis.complexity_level,
            further_inquiry = analysis.further_inquiry,
            issue = analysis.description_of_issue.as_deref().unwrap_or(""),
            "Response analysis"
        );

        let decision = Decision::for_analysis(analysis);
        match &decision {
            Decision::AskQuestions(None) => {
                tracing::warn!(
                    parent: &self.span,
                    "Further inquiry requested but no questions provided"
                )
            }
            Decision::GiveInstructions(None) => {
                tracing::warn!(parent: &self.span, "Instructions expected but none provided")
            }
            other => tracing::info!(parent: &self.span, decision = ?other, "Decision taken"),
        }
        decision.into_message()
    }

    fn interpret_text(&self, text: String) -> AgentResult<String> {
        if text.trim().is_empty() {
            tracing::warn!(parent: &self.span, "Model returned blank text");
            return Ok(NO_RESPONSE.to_string());
        }

        match serde_json::from_str::<Value>(strip_code_fence(&text)) {
            Ok(value) => self.interpret_value(&value),
            Err(_) => {
                tracing::info!(parent: &self.span, "Reply is not JSON, returning raw text");
                Ok(text)
            }
        }
    }

    fn interpret_value(&self, value: &Value) -> AgentResult<String> {
        let analysis = AnalysisResult::from_value(value)?;
        Ok(self.interpret_analysis(&analysis))
    }
}

fn diagnostic(error: &AgentError) -> String {
    match error {
        AgentError::ValidationError(detail) => format!(
            "Unable to interpret the repair analysis: required fields are missing or invalid ({}).",
            detail
        ),
        other => format!("Error processing repair analysis: {}", other),
    }
}

/// Unwrap a reply wrapped in a Markdown code fence, e.g. ```json ... ```
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop an info string such as `json` on the opening line
    match body.split_once('\n') {
        Some((info, inner)) if !info.trim().contains(char::is_whitespace) => inner.trim(),
        _ => body.trim(),
    }
}
