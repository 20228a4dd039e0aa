//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router (the relay's only dispatcher)
//! - Wire up middleware (tracing, limits, request ID, inbound timeout)
//! - Bind server to listener and shut down gracefully
//! - Hand `/proxify` bodies to the relay pipeline

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::RelayConfig;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::error_response;
use crate::observability::metrics;
use crate::relay::{RelayError, RequestForwarder, Submission};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<RequestForwarder>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Self {
        let state = AppState {
            forwarder: Arc::new(RequestForwarder::from_config(&config.timeouts)),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .route("/proxify", post(proxify_handler).fallback(method_not_allowed))
            .fallback(not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.listener.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer()),
            )
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream_deadline_secs = self.config.timeouts.upstream_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Relays one descriptor.
async fn proxify_handler(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers).to_string();

    tracing::debug!(request_id = %request_id, bytes = body.len(), "Descriptor received");

    let submission = match Submission::parse(&body) {
        Ok(submission) => submission,
        Err(e) => return reject(&request_id, "unknown", e, start_time),
    };
    let response_type = submission.response_type().as_str();

    match submission.relay(&state.forwarder).await {
        Ok(response) => {
            metrics::record_request(response_type, "ok", start_time);
            response
        }
        Err(e) => reject(&request_id, response_type, e, start_time),
    }
}

fn reject(request_id: &str, response_type: &str, e: RelayError, start_time: Instant) -> Response {
    tracing::warn!(request_id = %request_id, response_type, kind = e.kind(), error = %e, "Relay request rejected");
    metrics::record_request(response_type, e.kind(), start_time);
    e.into_response()
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Invalid request method")
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Page not Found!")
}
