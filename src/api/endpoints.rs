//! API endpoint handlers
//!
//! This module implements the HTTP endpoints of the service: the two
//! liveness checks and the code analysis endpoint.

use crate::api::cors::cors_layer;
use crate::api::error::ApiError;
use crate::conversion::request_converter::{build_chat_request, build_prompt, resolve_task};
use crate::conversion::response_converter::{completion_text, demo_analysis, parse_analysis};
use crate::core::config::Config;
use crate::core::model_manager::ModelManager;
use crate::core::provider::{Provider, ProviderError, ProviderType};
use crate::core::providers::create_provider;
use crate::models::analyze::{AnalyzeRequest, AnalyzeResponse};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, debug, info, info_span, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub model_manager: Arc<ModelManager>,
    pub providers: Arc<HashMap<ProviderType, Arc<dyn Provider>>>,
}

impl AppState {
    /// Build the state with one provider per configured key
    pub fn from_config(config: Config) -> Result<Self, ProviderError> {
        let mut providers = HashMap::new();
        for provider_type in config.configured_providers() {
            if let Some(credentials) = config.credentials(provider_type) {
                let provider = create_provider(provider_type, credentials, config.request_timeout)?;
                providers.insert(provider_type, provider);
            }
        }
        Ok(Self::with_providers(config, providers))
    }

    /// Build the state around already constructed providers
    pub fn with_providers(
        config: Config,
        providers: HashMap<ProviderType, Arc<dyn Provider>>,
    ) -> Self {
        Self {
            model_manager: Arc::new(ModelManager::new(&config)),
            config: Arc::new(config),
            providers: Arc::new(providers),
        }
    }

    fn provider_names(&self) -> Vec<&'static str> {
        self.config
            .configured_providers()
            .iter()
            .filter(|p| self.providers.contains_key(*p))
            .map(|p| p.as_str())
            .collect()
    }
}

/// Create the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/analyze", post(analyze))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// GET / - Root endpoint
async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": "JuniorDebug API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": state.provider_names(),
    }))
}

/// GET /health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "providers": state.provider_names(),
    }))
}

/// POST /analyze - Analyze submitted code with an AI provider
async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::Rejected {
        status: rejection.status(),
        message: rejection.body_text(),
    })?;

    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("analyze", %request_id);

    analyze_code(&state, request).instrument(span).await.map(Json)
}

async fn analyze_code(
    state: &AppState,
    request: AnalyzeRequest,
) -> Result<AnalyzeResponse, ApiError> {
    if request.code.trim().is_empty() {
        return Err(ApiError::BadRequest("Code must not be empty.".to_string()));
    }

    let task = resolve_task(request.task, request.task_description.as_deref()).ok_or_else(|| {
        ApiError::BadRequest(
            "Invalid or missing task. Provide a task id or task_description.".to_string(),
        )
    })?;

    info!(
        "📥 Analyze request: task={}, language={}, model={:?}, code_chars={}",
        task.as_str(),
        request.language,
        request.model,
        request.code.chars().count()
    );

    let prompt = build_prompt(&request.code, task, request.language);

    let Some(route) = state.model_manager.route(request.model, &prompt) else {
        return no_provider(state, &request.code);
    };

    let Some(provider) = state.providers.get(&route.provider) else {
        if state.providers.is_empty() {
            return no_provider(state, &request.code);
        }
        return Err(ApiError::BadRequest(format!(
            "{} API key not configured",
            route.provider
        )));
    };

    let chat_request = build_chat_request(
        prompt,
        &route.model,
        state.config.max_tokens,
        state.config.temperature,
    );

    debug!("Sending prompt to {} ({})", provider.provider_name(), route.model);
    let started = Instant::now();
    let completion = provider.create_chat_completion(&chat_request).await?;

    let finish_reason = completion
        .choices
        .first()
        .and_then(|c| c.finish_reason.as_deref())
        .unwrap_or("unknown");
    match &completion.usage {
        Some(usage) => info!(
            "📤 {} answered in {} ms: model={}, finish={}, tokens={}+{}={}",
            provider.provider_name(),
            started.elapsed().as_millis(),
            route.model,
            finish_reason,
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        ),
        None => info!(
            "📤 {} answered in {} ms: model={}, finish={}",
            provider.provider_name(),
            started.elapsed().as_millis(),
            route.model,
            finish_reason
        ),
    }

    Ok(parse_analysis(completion_text(&completion)))
}

/// Outcome when no provider can serve the request
fn no_provider(state: &AppState, code: &str) -> Result<AnalyzeResponse, ApiError> {
    if state.config.demo_mode {
        warn!("No AI provider configured; returning demonstration analysis");
        Ok(demo_analysis(code))
    } else {
        Err(ApiError::Unavailable("No AI provider configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TomlConfig;
    use crate::models::openai::{
        OpenAIChatCompletionRequest, OpenAIChatCompletionResponse, OpenAIChoice, OpenAIMessage,
    };
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use std::sync::Mutex;
    use tower::ServiceExt;

    enum MockReply {
        Text(String),
        RateLimit,
        Auth,
        Fail,
    }

    struct MockProvider {
        reply: MockReply,
        last_model: Mutex<Option<String>>,
    }

    impl MockProvider {
        fn new(reply: MockReply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                last_model: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl Provider for MockProvider {
        async fn create_chat_completion(
            &self,
            request: &OpenAIChatCompletionRequest,
        ) -> Result<OpenAIChatCompletionResponse, ProviderError> {
            *self.last_model.lock().unwrap() = Some(request.model.clone());
            match &self.reply {
                MockReply::Text(text) => Ok(OpenAIChatCompletionResponse {
                    id: "mock-1".to_string(),
                    model: request.model.clone(),
                    choices: vec![OpenAIChoice {
                        index: 0,
                        message: OpenAIMessage {
                            role: "assistant".to_string(),
                            content: Some(text.clone()),
                        },
                        finish_reason: Some("stop".to_string()),
                    }],
                    usage: None,
                }),
                MockReply::RateLimit => Err(ProviderError::RateLimit("quota".to_string())),
                MockReply::Auth => Err(ProviderError::Authentication("leaked".to_string())),
                MockReply::Fail => Err(ProviderError::ApiError {
                    status: 500,
                    message: "upstream exploded".to_string(),
                }),
            }
        }

        fn provider_name(&self) -> &str {
            "Mock"
        }
    }

    fn test_config(gemini: bool, demo_mode: bool) -> Config {
        let mut toml_config = TomlConfig::default();
        if gemini {
            toml_config.gemini.api_key = Some("AIzaTest1234567890".to_string());
        }
        toml_config.cors.frontend_url = Some("https://juniordebug.example.com".to_string());
        toml_config.request.demo_mode = demo_mode;
        Config::from_toml(toml_config).unwrap()
    }

    fn app_with(provider: Option<Arc<MockProvider>>, demo_mode: bool) -> Router {
        let mut providers: HashMap<ProviderType, Arc<dyn Provider>> = HashMap::new();
        if let Some(provider) = provider.clone() {
            providers.insert(ProviderType::Gemini, provider as Arc<dyn Provider>);
        }
        let state = AppState::with_providers(test_config(provider.is_some(), demo_mode), providers);
        create_router(state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    fn post_analyze(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    const MODEL_OUTPUT: &str = "```json\n{\"code\": \"const x = 1;\", \"explanations\": [{\"title\": \"Use const\", \"description\": \"x is never reassigned\"}]}\n```";

    #[tokio::test]
    async fn test_root_and_health() {
        let (status, body) = send(app_with(None, true), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "JuniorDebug API is running");

        let (status, body) = send(app_with(None, true), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let provider = MockProvider::new(MockReply::Text(MODEL_OUTPUT.to_string()));
        let app = app_with(Some(provider.clone()), true);

        let (status, body) = send(
            app,
            post_analyze(json!({
                "code": "var x = 1;",
                "task_description": "Improve structure",
                "model": "auto",
                "language": "javascript"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], "const x = 1;");
        assert_eq!(body["explanations"][0]["title"], "Use const");
        assert_eq!(
            provider.last_model.lock().unwrap().as_deref(),
            Some("gemini-flash-latest")
        );
    }

    #[tokio::test]
    async fn test_analyze_empty_code_rejected() {
        let provider = MockProvider::new(MockReply::Text(MODEL_OUTPUT.to_string()));
        let (status, body) = send(
            app_with(Some(provider.clone()), true),
            post_analyze(json!({ "code": "   ", "task": "debug" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Code must not be empty.");
        assert!(provider.last_model.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_analyze_missing_code_rejected() {
        let (status, body) = send(
            app_with(None, true),
            post_analyze(json!({ "task": "debug" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("code"));
    }

    #[tokio::test]
    async fn test_analyze_body_rejection_statuses() {
        let raw = |content_type: &str, body: &str| {
            Request::builder()
                .method("POST")
                .uri("/analyze")
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body.to_string()))
                .unwrap()
        };

        let (status, body) = send(app_with(None, true), raw("application/json", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());

        let (status, body) = send(
            app_with(None, true),
            raw("text/plain", r#"{"code": "x = 1", "task": "debug"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["detail"].as_str().unwrap().contains("application/json"));

        let (status, body) = send(
            app_with(None, true),
            post_analyze(json!({ "code": "x = 1", "task": "lint" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("lint"));
    }

    #[tokio::test]
    async fn test_analyze_unknown_task() {
        let (status, body) = send(
            app_with(None, true),
            post_analyze(json!({ "code": "x = 1", "task_description": "make it pretty" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().starts_with("Invalid or missing task"));
    }

    #[tokio::test]
    async fn test_analyze_demo_without_providers() {
        let (status, body) = send(
            app_with(None, true),
            post_analyze(json!({ "code": "print(1)", "task": "debug", "language": "python" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], "// Mock analysis for anonymous user\nprint(1)");

        let (status, _) = send(
            app_with(None, true),
            post_analyze(json!({ "code": "print(1)", "task": "debug", "model": "gpt-4o" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analyze_without_providers_demo_disabled() {
        let (status, body) = send(
            app_with(None, false),
            post_analyze(json!({ "code": "print(1)", "task": "debug" })),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "No AI provider configured");
    }

    #[tokio::test]
    async fn test_analyze_unconfigured_model_provider() {
        let provider = MockProvider::new(MockReply::Text(MODEL_OUTPUT.to_string()));
        let (status, body) = send(
            app_with(Some(provider), true),
            post_analyze(json!({ "code": "x", "task": "debug", "model": "gpt-4o" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "OpenAI API key not configured");
    }

    #[tokio::test]
    async fn test_analyze_provider_errors() {
        let cases = [
            (MockReply::RateLimit, StatusCode::TOO_MANY_REQUESTS),
            (MockReply::Auth, StatusCode::FORBIDDEN),
            (MockReply::Fail, StatusCode::BAD_GATEWAY),
        ];
        for (reply, expected) in cases {
            let (status, body) = send(
                app_with(Some(MockProvider::new(reply)), true),
                post_analyze(json!({ "code": "x", "task": "debug", "model": "gemini-pro-latest" })),
            )
            .await;
            assert_eq!(status, expected);
            assert!(body["detail"].is_string());
        }
    }

    #[tokio::test]
    async fn test_analyze_unparseable_output_still_succeeds() {
        let provider = MockProvider::new(MockReply::Text("No JSON here".to_string()));
        let (status, body) = send(
            app_with(Some(provider), true),
            post_analyze(json!({ "code": "x", "task": "comments" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["explanations"][0]["title"], "AI Response Error");
    }

    #[tokio::test]
    async fn test_cors_allows_frontend_origin() {
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://juniordebug.example.com")
            .body(Body::empty())
            .unwrap();
        let response = app_with(None, true).oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://juniordebug.example.com"
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_cors_preflight_from_dev_origin() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/analyze")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let response = app_with(None, true).oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "POST"
        );
    }

    #[tokio::test]
    async fn test_cors_rejects_other_origin() {
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://evil.example.com")
            .body(Body::empty())
            .unwrap();
        let response = app_with(None, true).oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }
}
