//! Error types for the HTTP service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use onedev_relay_core::WebhookError;
use tracing::{error, warn};

/// Machine-readable code for an unsupported event class
pub const UNSUPPORTED_EVENT_CODE: &str = "UNSUPPORTED_WEBHOOK_EVENT_TYPE";

/// Machine-readable code for unusable payloads
pub const BAD_REQUEST_CODE: &str = "BAD_REQUEST";

/// Machine-readable code for delivery failures
pub const DELIVERY_FAILED_CODE: &str = "DELIVERY_FAILED";

/// Seconds the sender should wait before retrying a transient failure
const RETRY_AFTER_SECONDS: u64 = 60;

/// Webhook handler errors with HTTP status code mapping
///
/// - `400 Bad Request`: the payload is unsupported or malformed; the sender
///   should not retry
/// - `502 Bad Gateway`: the delivery target rejected the notification
/// - `503 Service Unavailable`: the delivery target is temporarily
///   unavailable; the response carries `Retry-After`
#[derive(Debug, thiserror::Error)]
pub enum WebhookHandlerError {
    #[error(transparent)]
    Processing(#[from] WebhookError),
}

impl WebhookHandlerError {
    /// HTTP status, error code and whether `Retry-After` applies
    pub fn classify(&self) -> (StatusCode, &'static str, bool) {
        let Self::Processing(e) = self;
        match e {
            WebhookError::UnsupportedEvent { .. } => {
                (StatusCode::BAD_REQUEST, UNSUPPORTED_EVENT_CODE, false)
            }
            WebhookError::FieldExtraction(_) | WebhookError::MalformedPayload { .. } => {
                (StatusCode::BAD_REQUEST, BAD_REQUEST_CODE, false)
            }
            WebhookError::Delivery(d) if d.is_transient() => {
                (StatusCode::SERVICE_UNAVAILABLE, DELIVERY_FAILED_CODE, true)
            }
            WebhookError::Delivery(_) => (StatusCode::BAD_GATEWAY, DELIVERY_FAILED_CODE, false),
        }
    }
}

impl IntoResponse for WebhookHandlerError {
    fn into_response(self) -> Response {
        let (status, code, retryable) = self.classify();

        if status.is_server_error() {
            error!(error = %self, status = %status, "Webhook could not be relayed");
        } else {
            warn!(error = %self, status = %status, code = code, "Rejected webhook");
        }

        let body = serde_json::json!({
            "result": "error",
            "msg": self.to_string(),
            "code": code,
        });

        let mut response = (status, Json(body)).into_response();

        if retryable {
            if let Ok(header_value) = RETRY_AFTER_SECONDS.to_string().parse() {
                response.headers_mut().insert("Retry-After", header_value);
            }
        }

        response
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Configuration loading failed: {0}")]
    Load(#[from] config::ConfigError),
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
