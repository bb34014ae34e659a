//! HTTP surface of the relay: shared state and the Axum router.
//!
//! Routes:
//! - `POST /api/v1/chat` — forward a message to the model, return its reply
//! - `GET /health` — API and model runtime readiness

mod dto;
mod error;
mod handlers;
mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use relay_config::RelayConfig;
use relay_llm::{LlmBackend, OllamaClient, ReadinessProbe};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use dto::{ApiInfo, ChatRequest, ChatResponse, HealthReport};
pub use error::AppError;

/// Shared server state accessible from all handlers.
pub struct ServerState {
    pub config: RelayConfig,
    pub backend: Arc<dyn LlmBackend>,
    pub probe: Arc<dyn ReadinessProbe>,
}

impl ServerState {
    /// Builds the state around a single Ollama client serving both roles.
    pub fn new(config: RelayConfig) -> Self {
        let client = Arc::new(OllamaClient::new(&config));
        Self {
            config,
            backend: client.clone(),
            probe: client,
        }
    }

    /// Builds the state from explicit backend and probe implementations.
    pub fn with_backends(
        config: RelayConfig,
        backend: Arc<dyn LlmBackend>,
        probe: Arc<dyn ReadinessProbe>,
    ) -> Self {
        Self { config, backend, probe }
    }
}

/// Assembles the router with CORS and request tracing.
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let api_routes = Router::new().route("/chat", post(handlers::chat::chat));

    let logged_routes = Router::new()
        .nest("/api/v1", api_routes)
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/health", get(handlers::health::health))
        .layer(cors)
        .with_state(state)
}
