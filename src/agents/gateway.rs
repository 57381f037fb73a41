use serde::{Deserialize, Serialize};
use tracing::{Instrument, Span};
use uuid::Uuid;

use super::analyzer::{RequestAnalyzer, DEFAULT_TEMPLATE_KEY};
use super::interpreter::{ModelOutput, ResponseInterpreter};

pub const COMPLETION_FAILED: &str = "Failed to get response from the repair assistant service";

/// Outcome of one submitted prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PromptResponse {
    Success { response: String },
    Error { message: String },
}

impl PromptResponse {
    pub fn error(message: impl Into<String>) -> Self {
        PromptResponse::Error {
            message: message.into(),
        }
    }
}

/// Wires the analyzer and interpreter into the single submit operation
pub struct Gateway {
    analyzer: RequestAnalyzer,
    interpreter: ResponseInterpreter,
    span: Span,
}

impl Gateway {
    pub fn new(analyzer: RequestAnalyzer, interpreter: ResponseInterpreter) -> Self {
        Self {
            analyzer,
            interpreter,
            span: tracing::info_span!("gateway"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Keys of the prompt templates the analyzer can use
    pub fn prompt_keys(&self) -> Vec<String> {
        self.analyzer.prompts().keys()
    }

    /// Submit a customer prompt and return the message for the customer
    ///
    /// Exactly one completion call is made. A failed call yields an
    /// `Error` response; any reply text yields `Success`.
    pub async fn submit(&self, prompt: &str) -> PromptResponse {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(parent: &self.span, "submit", %request_id);

        async {
            match self.analyzer.analyze("", prompt, DEFAULT_TEMPLATE_KEY).await {
                Ok(text) => {
                    let response = self.interpreter.interpret(ModelOutput::Text(text));
                    tracing::info!(chars = response.len(), "Prompt handled");
                    PromptResponse::Success { response }
                }
                Err(e) => {
                    tracing::error!(kind = e.kind(), error = %e, "Prompt could not be analyzed");
                    PromptResponse::error(COMPLETION_FAILED)
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::client::CompletionClient;
    use crate::agents::errors::{AgentError, AgentResult};
    use crate::agents::interpreter::CONTRACTOR_DISPATCH;
    use crate::agents::prompts::{PromptStore, PromptTemplate};
    use crate::agents::types::CompletionRequest;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Canned(fn() -> AgentResult<String>);

    #[async_trait]
    impl CompletionClient for Canned {
        async fn send(&self, _request: &CompletionRequest) -> AgentResult<String> {
            (self.0)()
        }
    }

    fn gateway(reply: fn() -> AgentResult<String>) -> Gateway {
        let prompts = Arc::new(PromptStore::from_templates(vec![PromptTemplate {
            key: "repair_analysis".to_string(),
            content: "Triage this.".to_string(),
        }]));
        let analyzer = RequestAnalyzer::new(prompts, Arc::new(Canned(reply)))
            .with_span(tracing::info_span!("request_analyzer"));
        let interpreter =
            ResponseInterpreter::new().with_span(tracing::info_span!("response_interpreter"));
        Gateway::new(analyzer, interpreter).with_span(tracing::info_span!("gateway"))
    }

    #[tokio::test]
    async fn test_submit_success() {
        let gateway = gateway(|| {
            Ok(serde_json::json!({
                "parts_needed": true,
                "complexity_level": "low",
                "further_inquiry": false
            })
            .to_string())
        });

        assert_eq!(
            gateway.submit("My boiler is broken").await,
            PromptResponse::Success {
                response: CONTRACTOR_DISPATCH.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_submit_timeout_is_error_status() {
        let gateway = gateway(|| Err(AgentError::NetworkError("operation timed out".to_string())));

        match gateway.submit("anything").await {
            PromptResponse::Error { message } => assert!(!message.is_empty()),
            other => panic!("expected error response, got {:?}", other),
        }
    }

    #[test]
    fn test_response_serialization() {
        let ok = serde_json::to_value(PromptResponse::Success {
            response: "hi".to_string(),
        })
        .unwrap();
        let err = serde_json::to_value(PromptResponse::error("boom")).unwrap();

        assert_eq!(ok, serde_json::json!({"status": "success", "response": "hi"}));
        assert_eq!(err, serde_json::json!({"status": "error", "message": "boom"}));
    }
}
