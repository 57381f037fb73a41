// Repair triage core
//
// A customer prompt is merged with an instruction template, sent to the
// completion service, and the reply is interpreted into one message.

pub mod analyzer;
pub mod client;
pub mod errors;
pub mod gateway;
pub mod interpreter;
pub mod prompts;
pub mod types;

// Re-export main types
pub use analyzer::RequestAnalyzer;
pub use client::{ClaudeClient, CompletionClient};
pub use errors::{AgentError, AgentResult};
pub use gateway::{Gateway, PromptResponse};
pub use interpreter::{ModelOutput, ResponseInterpreter};
pub use prompts::{PromptStore, PromptTemplate};
pub use types::{AnalysisResult, ComplexityLevel, CompletionRequest};
