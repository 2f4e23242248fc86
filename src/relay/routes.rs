//! HTTP surface: chat, lead capture, the optional WhatsApp webhook, health
//! and static files.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::HeaderValue;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::Value;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use super::orchestrator::RequestOrchestrator;
use crate::channels::web::{self, ChatRequest};
use crate::channels::whatsapp::WhatsAppInbound;
use crate::config::{FeatureFlags, RelayConfig};

/// JSON request body limit.
pub const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// Shared state for relay routes.
#[derive(Clone)]
pub struct RelayState {
    pub orchestrator: Arc<RequestOrchestrator>,
}

/// Router composition inputs resolved at startup.
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    pub flags: FeatureFlags,
    /// Allowed origins; empty or containing `*` allows any origin.
    pub cors_origins: Vec<String>,
    pub static_dir: Option<PathBuf>,
}

impl RouterOptions {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            flags: FeatureFlags::from_config(config),
            cors_origins: config.cors_origins.clone(),
            static_dir: config.static_dir.clone(),
        }
    }
}

/// Build the relay router.
pub fn relay_routes(orchestrator: Arc<RequestOrchestrator>, options: &RouterOptions) -> Router {
    let state = RelayState { orchestrator };

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/lead", post(lead));

    if options.flags.whatsapp {
        router = router.route("/webhooks/whatsapp", post(whatsapp_webhook));
    }

    let mut router = router
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors_layer(&options.cors_origins));

    if let Some(dir) = &options.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "chat-relay"
    }))
}

// ── Handlers ────────────────────────────────────────────────────────────

/// POST /api/chat
///
/// An unreadable body gets the same generic failure as a provider error.
async fn chat(
    State(state): State<RelayState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> impl IntoResponse {
    match body {
        Ok(Json(request)) => state.orchestrator.handle_chat(request).await,
        Err(e) => {
            warn!(error = %e, "Unreadable chat request");
            web::failure()
        }
    }
}

/// POST /api/lead
///
/// Always `{ok: true}`, whatever the body and whatever the notifier does.
async fn lead(
    State(state): State<RelayState>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(e) => {
            info!(error = %e, "Lead body unreadable, capturing empty lead");
            Value::Object(Default::default())
        }
    };
    Json(state.orchestrator.capture_lead(payload).await)
}

/// POST /webhooks/whatsapp
///
/// Always answers TwiML, even for a malformed form body.
async fn whatsapp_webhook(
    State(state): State<RelayState>,
    form: Result<Form<WhatsAppInbound>, FormRejection>,
) -> impl IntoResponse {
    let inbound = match form {
        Ok(Form(inbound)) => inbound,
        Err(e) => {
            warn!(error = %e, "Unreadable WhatsApp webhook body");
            WhatsAppInbound::default()
        }
    };
    state.orchestrator.handle_whatsapp(inbound).await
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::error::LlmError;
    use crate::leads::DisabledNotifier;
    use crate::llm::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};

    struct EchoLlm;

    #[async_trait]
    impl LlmProvider for EchoLlm {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(CompletionResponse {
                content: format!("echo: {last}"),
                input_tokens: 0,
                output_tokens: 0,
                finish_reason: FinishReason::Stop,
                response_id: None,
            })
        }
    }

    fn app(flags: FeatureFlags) -> Router {
        app_with(RouterOptions {
            flags,
            ..Default::default()
        })
    }

    fn app_with(options: RouterOptions) -> Router {
        let orchestrator = Arc::new(RequestOrchestrator::new(
            Arc::new(EchoLlm),
            Arc::new(DisabledNotifier),
        ));
        relay_routes(orchestrator, &options)
    }

    fn cors_app(origins: &[&str]) -> Router {
        app_with(RouterOptions {
            cors_origins: origins.iter().map(|o| o.to_string()).collect(),
            ..Default::default()
        })
    }

    async fn allowed_origin(app: Router, origin: &str) -> Option<String> {
        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/chat")
                    .header(header::ORIGIN, origin)
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn whatsapp_route_absent_without_flag() {
        let response = app(FeatureFlags { whatsapp: false })
            .oneshot(
                Request::post("/webhooks/whatsapp")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("Body=hola"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn whatsapp_route_present_with_flag() {
        let response = app(FeatureFlags { whatsapp: true })
            .oneshot(
                Request::post("/webhooks/whatsapp")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("Body=+hola+&From=whatsapp%3A%2B34600000000"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/xml"
        );
        let body = body_string(response).await;
        assert!(body.contains("<Message>echo: hola</Message>"));
    }

    #[tokio::test]
    async fn whatsapp_malformed_body_still_gets_twiml() {
        let response = app(FeatureFlags { whatsapp: true })
            .oneshot(
                Request::post("/webhooks/whatsapp")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/xml"
        );
        assert!(body_string(response).await.contains("<Message>"));
    }

    #[tokio::test]
    async fn chat_with_invalid_json_is_generic_failure() {
        let response = app(FeatureFlags::default())
            .oneshot(
                Request::post("/api/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json, serde_json::json!({"error": "Fallo en el chat"}));
    }

    #[tokio::test]
    async fn lead_without_body_is_acknowledged() {
        let response = app(FeatureFlags::default())
            .oneshot(Request::post("/api/lead").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json, serde_json::json!({"ok": true}));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app(FeatureFlags::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn chat_with_null_history_replies() {
        let response = app(FeatureFlags::default())
            .oneshot(
                Request::post("/api/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"messages": null, "business": "Acme"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(json["reply"].as_str().unwrap().starts_with("echo: "));
    }

    #[tokio::test]
    async fn cors_without_list_allows_any_origin() {
        for origins in [&[][..], &["*"][..]] {
            assert_eq!(
                allowed_origin(cors_app(origins), "https://anywhere.example").await.as_deref(),
                Some("*")
            );
        }
    }

    #[tokio::test]
    async fn cors_list_echoes_only_listed_origins() {
        let origins = ["https://a.example", "bad\norigin", "https://b.example"];
        assert_eq!(
            allowed_origin(cors_app(&origins), "https://b.example").await.as_deref(),
            Some("https://b.example")
        );
        assert_eq!(allowed_origin(cors_app(&origins), "https://evil.example").await, None);
    }
}
