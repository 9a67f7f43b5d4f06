//! HTTP API gateway for Coursebot.
//!
//! Exposes the course assistant over three routes: `/health`, `/info`, and
//! `/chat`. All request-level failures are converted to a JSON
//! `{"error": ...}` body with a 400 or 500 status; nothing a request does
//! can take the server down.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use coursebot_agent::ChatOrchestrator;
use coursebot_config::{AppConfig, GatewayConfig};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: ChatOrchestrator,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all routes and layers.
///
/// Layers applied:
/// - CORS (any origin unless `allowed_origins` is set)
/// - Request body size limit (1 MB)
/// - Panic recovery (500 JSON error, server keeps running)
/// - HTTP trace logging
pub fn build_router(state: SharedState, gateway: &GatewayConfig) -> Router {
    Router::new()
        .route("/health", get(api::health_handler))
        .route("/info", get(api::info_handler))
        .route("/chat", post(api::chat_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CatchPanicLayer::custom(api::panic_response))
        .layer(cors_layer(&gateway.allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// CORS for the browser frontend. An empty list allows any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Start the gateway HTTP server and serve until Ctrl-C.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let orchestrator = ChatOrchestrator::from_config(&config)?;
    if !orchestrator.has_provider() {
        warn!("ANTHROPIC_API_KEY environment variable not set; /chat will fail until it is");
    }

    let store = orchestrator.context().store();
    if !store.exists() {
        warn!(dir = %store.root().display(), "Knowledge base directory missing, creating it");
        std::fs::create_dir_all(store.root())?;
    }

    let state = Arc::new(GatewayState { orchestrator });
    let app = build_router(state, &config.gateway);

    info!(addr = %addr, model = %config.model, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use tower::ServiceExt;

    use coursebot_agent::ContextBuilder;
    use coursebot_core::error::ProviderError;
    use coursebot_core::provider::{
        ContentSegment, Provider, ProviderRequest, ProviderResponse, Usage,
    };
    use coursebot_core::{
        ChapterConvention, ContextAssembler, ContextMode, DocumentStore, InstructionSource,
        KeywordIndex,
    };

    /// Lightweight mock provider for gateway tests.
    struct MockProvider {
        reply: Result<Vec<&'static str>, ProviderError>,
        calls: Mutex<usize>,
        panics: bool,
    }

    impl MockProvider {
        fn new(reply: Result<Vec<&'static str>, ProviderError>) -> Self {
            Self {
                reply,
                calls: Mutex::new(0),
                panics: false,
            }
        }

        fn panicking() -> Self {
            Self {
                panics: true,
                ..Self::new(Ok(vec![]))
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            if self.panics {
                panic!("provider blew up");
            }
            let segments = self.reply.clone()?;
            Ok(ProviderResponse {
                content: segments.into_iter().map(ContentSegment::text).collect(),
                usage: Some(Usage {
                    input_tokens: 10,
                    output_tokens: 5,
                }),
                model: "mock-model".into(),
            })
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        app: Router,
        provider: Option<Arc<MockProvider>>,
    }

    fn fixture(provider: Option<MockProvider>) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("syllabus.txt"), "Week 1: intro").unwrap();
        std::fs::write(dir.path().join("Ch06_Polymers.txt"), "PMMA").unwrap();

        let context = ContextBuilder::new(
            KeywordIndex::builtin(),
            InstructionSource::builtin(),
            DocumentStore::new(dir.path()),
            ContextAssembler::new(ChapterConvention::default(), ContextMode::Selective),
        );
        let mut orchestrator = ChatOrchestrator::new(context, "mock-model", 4096);
        let provider = provider.map(Arc::new);
        if let Some(p) = &provider {
            orchestrator = orchestrator.with_provider(p.clone());
        }

        let app = build_router(
            Arc::new(GatewayState { orchestrator }),
            &GatewayConfig::default(),
        );
        Fixture {
            _dir: dir,
            app,
            provider,
        }
    }

    fn post_chat(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let fx = fixture(None);
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = fx.app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn info_lists_documents() {
        let fx = fixture(None);
        let req = Request::builder().uri("/info").body(Body::empty()).unwrap();

        let response = fx.app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["files_loaded"], 2);
        assert_eq!(
            json["files"],
            serde_json::json!(["Ch06_Polymers.txt", "syllabus.txt"])
        );
    }

    #[tokio::test]
    async fn chat_success_returns_response_and_usage() {
        let fx = fixture(Some(MockProvider::new(Ok(vec!["PMMA is ", "an acrylic resin."]))));

        let response = fx
            .app
            .oneshot(post_chat(
                r#"{"message":"What resin is used in dentures?","history":[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["response"], "PMMA is an acrylic resin.");
        assert_eq!(json["model"], "mock-model");
        assert_eq!(json["usage"]["input_tokens"], 10);
        assert_eq!(json["usage"]["output_tokens"], 5);
    }

    #[tokio::test]
    async fn empty_message_is_400_and_provider_not_called() {
        let fx = fixture(Some(MockProvider::new(Ok(vec!["unused"]))));

        let response = fx.app.clone().oneshot(post_chat(r#"{"message":""}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());

        let response = fx.app.oneshot(post_chat(r#"{"history":[]}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert_eq!(fx.provider.unwrap().calls(), 0);
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let fx = fixture(Some(MockProvider::new(Ok(vec!["unused"]))));
        let response = fx.app.oneshot(post_chat("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn missing_api_key_is_500() {
        let fx = fixture(None);
        let response = fx
            .app
            .oneshot(post_chat(r#"{"message":"What is zirconia?"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("ANTHROPIC_API_KEY"));
    }

    #[tokio::test]
    async fn upstream_failure_is_500_with_message() {
        let fx = fixture(Some(MockProvider::new(Err(ProviderError::ApiError {
            status_code: 529,
            message: "Overloaded".into(),
        }))));
        let response = fx
            .app
            .oneshot(post_chat(r#"{"message":"What is zirconia?"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "API error: Overloaded");
    }

    #[tokio::test]
    async fn handler_panic_is_500_and_server_keeps_serving() {
        let fx = fixture(Some(MockProvider::panicking()));

        let response = fx
            .app
            .clone()
            .oneshot(post_chat(r#"{"message":"What is zirconia?"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Internal server error");

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = fx.app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(fx.provider.unwrap().calls(), 1);
    }

    #[tokio::test]
    async fn oversized_body_is_413() {
        let fx = fixture(Some(MockProvider::new(Ok(vec!["unused"]))));
        let body = format!(r#"{{"message":"{}"}}"#, "a".repeat(1024 * 1024 + 16));

        let response = fx.app.oneshot(post_chat(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().starts_with("Invalid request body"));
        assert_eq!(fx.provider.unwrap().calls(), 0);
    }

    #[tokio::test]
    async fn cors_preflight_allows_any_origin_by_default() {
        let fx = fixture(None);
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/chat")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();

        let response = fx.app.oneshot(req).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
