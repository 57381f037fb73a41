use thiserror::Error;

/// Errors that can occur while triaging a repair request
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Prompt configuration error: {0}")]
    ConfigError(String),

    #[error("Prompt key '{0}' not found in prompt configuration")]
    NotFound(String),

    #[error("Empty content for prompt key '{0}'")]
    EmptyContent(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Network error when calling completion service: {0}")]
    NetworkError(String),

    #[error("Completion service returned status {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Unexpected response format from completion service: {0}")]
    MalformedResponse(String),

    #[error("Invalid repair analysis: {0}")]
    ValidationError(String),
}

impl AgentError {
    /// Short, stable name of the failure class, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::ConfigError(_) => "config",
            AgentError::NotFound(_) => "not_found",
            AgentError::EmptyContent(_) => "empty_content",
            AgentError::AuthError(_) => "auth",
            AgentError::NetworkError(_) => "network",
            AgentError::ApiStatus { .. } => "api_status",
            AgentError::MalformedResponse(_) => "malformed_response",
            AgentError::ValidationError(_) => "validation",
        }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
