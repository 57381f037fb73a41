use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use repair_triage_api::agents::{
    ClaudeClient, Gateway, PromptStore, RequestAnalyzer, ResponseInterpreter,
};
use repair_triage_api::api::handlers::prompt;
use repair_triage_api::config::AppConfig;
use repair_triage_api::platform;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = AppConfig::from_env();

    // Optional identity platform
    let platform_status = platform::discover(&config.service_account_path);
    tracing::info!(enabled = platform_status.is_enabled(), "Platform integration checked");

    // Prompt templates
    let prompts = Arc::new(
        PromptStore::load(&config.prompts_file).expect("Failed to load prompt templates"),
    );

    // Component spans carry the settings they run with
    let model = config.completion.model.clone();
    let client_span = tracing::info_span!(
        "completion_client",
        api_url = %config.completion.api_url
    );
    let client = ClaudeClient::new(config.completion)
        .expect("Failed to build completion client")
        .with_span(client_span);

    let analyzer = RequestAnalyzer::new(prompts, Arc::new(client))
        .with_model(model.clone())
        .with_span(tracing::info_span!("request_analyzer", %model));
    let interpreter = ResponseInterpreter::new()
        .with_span(tracing::info_span!("response_interpreter", %model));
    let gateway = Arc::new(
        Gateway::new(analyzer, interpreter)
            .with_span(tracing::info_span!("gateway", addr = %config.bind_addr)),
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/ping", get(prompt::ping))
        .route("/health", get(prompt::health_check))
        .route("/prompts", get(prompt::list_prompts))
        .route("/handle-prompt", post(prompt::handle_prompt))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(gateway);

    // Start server
    tracing::info!("Server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .await
        .expect("Server failed");
}
