//! # Onedev-Relay HTTP Service
//!
//! HTTP host for the Onedev webhook relay.
//!
//! This service provides:
//! - The Onedev webhook endpoint (`POST /api/v1/external/onedev` by default),
//!   accepting optional `topic` and `branches` query parameters
//! - A health check endpoint (`GET /health`)
//!
//! Each accepted webhook is classified, formatted and handed to the
//! configured [`MessageSink`](onedev_relay_core::MessageSink).

pub mod config;
pub mod delivery;
pub mod errors;
pub mod responses;

pub use config::ServiceConfig;
pub use errors::{ConfigError, ServiceError, WebhookHandlerError};

use axum::{
    extract::{DefaultBodyLimit, Query, State},
    middleware,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use onedev_relay_core::{ProcessingOutcome, WebhookHandler, WebhookParams};
use responses::{HealthResponse, SuccessResponse, WebhookQuery};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: Arc<ServiceConfig>,

    /// Classification, formatting and delivery pipeline
    pub handler: WebhookHandler,
}

impl AppState {
    /// Create new application state
    pub fn new(config: ServiceConfig, handler: WebhookHandler) -> Self {
        Self {
            config: Arc::new(config),
            handler,
        }
    }

    /// Build state from configuration, wiring the configured delivery sink
    /// and event allow list.
    pub fn from_config(config: ServiceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sink = delivery::build_sink(&config.delivery)?;
        let handler = WebhookHandler::new(sink)
            .with_allowed_events(config.webhooks.allowed_events()?);
        Ok(Self::new(config, handler))
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let webhook_routes = Router::new()
        .route(&state.config.webhooks.endpoint_path, post(handle_webhook))
        .layer(DefaultBodyLimit::max(state.config.server.max_body_size));

    let health_routes = Router::new().route("/health", get(handle_health_check));

    Router::new()
        .merge(webhook_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logging_middleware))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server and serve until SIGINT or SIGTERM
pub async fn start_server(state: AppState) -> Result<(), ServiceError> {
    let server = state.config.server.clone();
    let address = format!("{}:{}", server.host, server.port);
    let addr: SocketAddr = address.parse().map_err(|e| ServiceError::BindFailed {
        address: address.clone(),
        message: format!("invalid socket address: {e}"),
    })?;

    let listener =
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: addr.to_string(),
                message: e.to_string(),
            })?;

    let app = create_router(state);
    info!("Starting HTTP server on {}", addr);

    let shutdown_timeout = Duration::from_secs(server.shutdown_timeout_seconds);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

async fn shutdown_signal(shutdown_timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
        },
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Handle a Onedev webhook request
#[instrument(skip(state, query, body), fields(topic = ?query.topic, branches = ?query.branches))]
pub async fn handle_webhook(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, WebhookHandlerError> {
    let params = WebhookParams {
        topic: query.topic,
        branches: query.branches,
        include_title: state.config.webhooks.include_title,
    };

    match state.handler.process(&body, &params).await? {
        ProcessingOutcome::Delivered(message) => {
            info!(
                event_type = %message.event_type,
                topic = %message.topic,
                "Webhook relayed"
            );
        }
        ProcessingOutcome::Filtered { kind } => {
            info!(event_type = %kind, "Webhook acknowledged without notification");
        }
    }

    Ok(Json(SuccessResponse::new()))
}

/// Basic health check endpoint
async fn handle_health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

// ============================================================================
// Middleware
// ============================================================================

/// Request logging middleware
///
/// Tags each request with a correlation ID taken from `x-correlation-id` or
/// freshly generated, and echoes it on the response.
#[instrument(skip(request, next), fields(
    method = %request.method(),
    uri = %request.uri(),
    correlation_id
))]
async fn request_logging_middleware(
    mut request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let start = std::time::Instant::now();

    let correlation_id = request
        .headers()
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::Span::current().record("correlation_id", correlation_id.as_str());
    request.extensions_mut().insert(correlation_id.clone());

    let mut response = next.run(request).await;
    let duration = start.elapsed();

    if let Ok(header_value) = correlation_id.parse() {
        response
            .headers_mut()
            .insert("x-correlation-id", header_value);
    }

    let status = response.status();
    if status.is_server_error() {
        error!(status = %status, duration_ms = %duration.as_millis(), "Request completed with server error");
    } else if status.is_client_error() {
        warn!(status = %status, duration_ms = %duration.as_millis(), "Request completed with client error");
    } else {
        info!(status = %status, duration_ms = %duration.as_millis(), "Request completed successfully");
    }

    response
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
