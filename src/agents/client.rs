use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use tracing::Span;

use super::errors::{AgentError, AgentResult};
use super::types::{CompletionRequest, MessagesRequest, MessagesResponse};
use crate::config::CompletionConfig;

/// Sends a combined prompt to a text-completion service
///
/// One attempt per call: implementations do not retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the text of the first content item of the reply
    async fn send(&self, request: &CompletionRequest) -> AgentResult<String>;
}

/// Messages API client over HTTP
pub struct ClaudeClient {
    config: CompletionConfig,
    http: reqwest::Client,
    span: Span,
}

impl ClaudeClient {
    pub fn new(config: CompletionConfig) -> AgentResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http,
            span: tracing::info_span!("completion_client"),
        })
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    fn network_error(&self, e: reqwest::Error) -> AgentError {
        tracing::error!(
            parent: &self.span,
            error = %e,
            timeout = e.is_timeout(),
            "Network error when calling completion service"
        );
        AgentError::NetworkError(e.to_string())
    }

    fn headers(&self) -> AgentResult<HeaderMap> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            AgentError::AuthError(
                "CLAUDE_API_KEY environment variable not set. Please check your .env file."
                    .to_string(),
            )
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| AgentError::AuthError(format!("Invalid API key format: {}", e)))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(&self.config.api_version).map_err(|e| {
                AgentError::AuthError(format!("Invalid API version format: {}", e))
            })?,
        );
        Ok(headers)
    }
}

#[async_trait]
impl CompletionClient for ClaudeClient {
    async fn send(&self, request: &CompletionRequest) -> AgentResult<String> {
        let headers = self.headers().map_err(|e| {
            tracing::error!(parent: &self.span, error = %e, "Completion credentials unavailable");
            e
        })?;

        tracing::debug!(
            parent: &self.span,
            model = %request.model_id,
            max_tokens = request.max_tokens,
            "Sending request to completion service"
        );

        let response = self
            .http
            .post(&self.config.api_url)
            .headers(headers)
            .json(&MessagesRequest::from(request))
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(|e| self.network_error(e))?;
            tracing::error!(
                parent: &self.span,
                status = status.as_u16(),
                %body,
                "Completion request failed"
            );
            return Err(AgentError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        // Read the body before decoding so a stalled transfer is reported
        // as a network failure, not as a bad payload
        let body = response.bytes().await.map_err(|e| self.network_error(e))?;

        let payload: MessagesResponse = serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(parent: &self.span, error = %e, "Completion payload is not valid JSON");
            AgentError::MalformedResponse(e.to_string())
        })?;

        first_text(payload).map_err(|e| {
            tracing::error!(
                parent: &self.span,
                error = %e,
                "Unexpected response format from completion service"
            );
            e
        })
    }
}

fn first_text(payload: MessagesResponse) -> AgentResult<String> {
    let first = payload
        .content
        .and_then(|items| items.into_iter().next())
        .ok_or_else(|| {
            AgentError::MalformedResponse("missing or empty content list".to_string())
        })?;

    match first.get("text").and_then(Value::as_str) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        Some(_) => Err(AgentError::MalformedResponse(
            "first content item has empty text".to_string(),
        )),
        None => Err(AgentError::MalformedResponse(
            "first content item has no text".to_string(),
        )),
    }
}
