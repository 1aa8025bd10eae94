//! Delivery collaborators for rendered notifications.
//!
//! [`LogSink`] only records the notification in the service log and is the
//! default. [`HttpForwardSink`] POSTs each [`OutboundMessage`] as JSON to a
//! configured endpoint, for example a bot that writes into the chat system.

use crate::{config::DeliveryConfig, errors::ConfigError};
use async_trait::async_trait;
use onedev_relay_core::{DeliveryError, MessageSink, OutboundMessage};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Build the sink selected by configuration
pub fn build_sink(config: &DeliveryConfig) -> Result<Arc<dyn MessageSink>, ConfigError> {
    match config {
        DeliveryConfig::Log => Ok(Arc::new(LogSink)),
        DeliveryConfig::Http {
            url,
            timeout_seconds,
        } => {
            let sink = HttpForwardSink::new(url.clone(), Duration::from_secs(*timeout_seconds))
                .map_err(|e| ConfigError::Invalid {
                    message: format!("Failed to build HTTP delivery client: {e}"),
                })?;
            info!(
                url = %sink.url(),
                timeout_seconds = *timeout_seconds,
                "Forwarding notifications over HTTP"
            );
            Ok(Arc::new(sink))
        }
    }
}

/// Writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl MessageSink for LogSink {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        info!(
            topic = %message.topic,
            event_type = %message.event_type,
            body = %message.body,
            "Notification ready"
        );
        Ok(())
    }
}

/// Forwards notifications as JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpForwardSink {
    client: reqwest::Client,
    url: String,
}

impl HttpForwardSink {
    /// Create a sink posting to `url` with a per-request timeout
    pub fn new(url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("onedev-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, url })
    }

    /// Target endpoint
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MessageSink for HttpForwardSink {
    #[instrument(skip(self, message), fields(url = %self.url, event_type = %message.event_type))]
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    DeliveryError::Permanent {
                        message: e.to_string(),
                    }
                } else {
                    DeliveryError::Transient {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(status = %status, "Notification forwarded");
            return Ok(());
        }

        let message = format!("{} responded with {}", self.url, status);
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Err(DeliveryError::Transient { message })
        } else {
            Err(DeliveryError::Permanent { message })
        }
    }
}

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;
