use std::sync::Arc;

use tracing::Span;

use super::client::CompletionClient;
use super::errors::AgentResult;
use super::prompts::PromptStore;
use super::types::CompletionRequest;
use crate::config::DEFAULT_MODEL;

/// Template used when the caller does not name one
pub const DEFAULT_TEMPLATE_KEY: &str = "repair_analysis";

/// Token budget for every completion request
pub const MAX_TOKENS: u32 = 2048;

/// Combines customer input with a named instruction template and asks the
/// completion service for an analysis
pub struct RequestAnalyzer {
    prompts: Arc<PromptStore>,
    client: Arc<dyn CompletionClient>,
    model: String,
    span: Span,
}

impl RequestAnalyzer {
    pub fn new(prompts: Arc<PromptStore>, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            prompts,
            client,
            model: DEFAULT_MODEL.to_string(),
            span: tracing::info_span!("request_analyzer"),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn prompts(&self) -> &PromptStore {
        &self.prompts
    }

    /// Analyze a customer request
    ///
    /// Looks up `template_key`, appends the customer sections to it and
    /// sends the result in a single completion call. Failures from the
    /// template lookup or the call are returned unchanged.
    pub async fn analyze(
        &self,
        customer_info: &str,
        customer_prompt: &str,
        template_key: &str,
    ) -> AgentResult<String> {
        let base_prompt = self.prompts.get(template_key)?;
        let combined_prompt = combine_prompt(&base_prompt, customer_info, customer_prompt);

        let request = CompletionRequest {
            model_id: self.model.clone(),
            max_tokens: MAX_TOKENS,
            combined_prompt,
        };

        tracing::info!(
            parent: &self.span,
            template_key,
            "Sending customer request to completion service"
        );
        tracing::debug!(
            parent: &self.span,
            chars = request.combined_prompt.len(),
            "Combined prompt built"
        );

        match self.client.send(&request).await {
            Ok(text) => {
                tracing::info!(parent: &self.span, chars = text.len(), "Received completion");
                Ok(text)
            }
            Err(e) => {
                tracing::error!(
                    parent: &self.span,
                    kind = e.kind(),
                    error = %e,
                    "Failed to get completion"
                );
                Err(e)
            }
        }
    }
}

/// Base prompt followed by the customer sections, inputs copied verbatim
pub fn combine_prompt(base_prompt: &str, customer_info: &str, customer_prompt: &str) -> String {
    format!(
        "{}\n\nCustomer Information:\n{}\n\nCustomer Request:\n{}",
        base_prompt, customer_info, customer_prompt
    )
}
