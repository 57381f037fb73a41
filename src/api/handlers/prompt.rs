use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::agents::gateway::{Gateway, PromptResponse};
use crate::api::errors::ApiError;

/// Request body for a customer prompt
#[derive(Debug, Deserialize)]
pub struct PromptInput {
    pub prompt: String,
}

/// Available prompt templates
#[derive(Debug, Serialize)]
pub struct PromptsResponse {
    pub prompts: Vec<String>,
}

/// Handle a customer prompt
///
/// POST /handle-prompt
///
/// Always answers 200 with a `status` of `success` or `error` once the body
/// is accepted; any prompt text, including an empty one, is submitted. The
/// submission runs on its own task so a panic inside it still produces an
/// `error` response.
pub async fn handle_prompt(
    State(gateway): State<Arc<Gateway>>,
    payload: Result<Json<PromptInput>, JsonRejection>,
) -> Result<Json<PromptResponse>, ApiError> {
    let Json(input) = payload?;

    let response = tokio::spawn(async move { gateway.submit(&input.prompt).await })
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Prompt task failed");
            PromptResponse::error(format!("Internal error while handling prompt: {}", e))
        });

    Ok(Json(response))
}

/// List prompt template keys
///
/// GET /prompts
pub async fn list_prompts(State(gateway): State<Arc<Gateway>>) -> Json<PromptsResponse> {
    Json(PromptsResponse {
        prompts: gateway.prompt_keys(),
    })
}

/// Liveness probe
///
/// GET /ping
pub async fn ping() -> Json<Value> {
    Json(json!({ "status": "pong" }))
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
