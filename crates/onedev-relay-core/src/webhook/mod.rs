//! # Webhook Processing Module
//!
//! Turns a raw Onedev webhook body into a chat notification and hands it to
//! a [`MessageSink`].
//!
//! ```text
//! body bytes ─► parse ─► classify ─► allow-list ─► format ─► MessageSink
//! ```
//!
//! Each request is an independent, stateless transform. The only side effect
//! is the final [`MessageSink::deliver`] call; errors propagate to the caller
//! immediately and are never retried here.

use crate::ErrorCategory;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

pub mod classifier;
pub mod formatter;
pub mod link_repair;
pub mod payload;
pub mod templates;

#[cfg(test)]
pub(crate) mod test_fixtures;

use classifier::{classify, Classification, EventKind};
use formatter::{format_event, FormatOptions};
use payload::FieldExtractionError;

// ============================================================================
// Core Types
// ============================================================================

/// Optional parameters supplied with the webhook request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookParams {
    /// Topic that replaces the computed one
    #[serde(default)]
    pub topic: Option<String>,

    /// Branch filter. Accepted for compatibility with other forge
    /// integrations; no Onedev event is filtered by branch yet.
    #[serde(default)]
    pub branches: Option<String>,

    /// Include the pull request title in pull request bodies
    #[serde(default)]
    pub include_title: bool,
}

impl WebhookParams {
    fn format_options(&self) -> FormatOptions {
        FormatOptions {
            topic_override: self.topic.clone(),
            include_title: self.include_title,
        }
    }
}

/// Message handed to the delivery collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub topic: String,
    pub body: String,
    /// Event kind name, e.g. `issue_opened`
    pub event_type: String,
}

/// What happened to an accepted webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
    /// The notification was rendered and delivered
    Delivered(OutboundMessage),
    /// The event kind is supported but not enabled for this integration
    Filtered { kind: EventKind },
}

// ============================================================================
// Error Types
// ============================================================================

/// Top-level error for webhook processing failures
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error(
        "The '{}' event isn't currently supported by the Onedev webhook",
        display_discriminator(.discriminator)
    )]
    UnsupportedEvent { discriminator: Option<String> },

    #[error("Field extraction failed: {0}")]
    FieldExtraction(#[from] FieldExtractionError),

    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    #[error("Message delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

impl WebhookError {
    /// Check if error is transient and the sender may retry
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Delivery(delivery_error) => delivery_error.is_transient(),
            Self::UnsupportedEvent { .. } => false,
            Self::FieldExtraction(_) => false,
            Self::MalformedPayload { .. } => false,
        }
    }

    /// Get error category for monitoring
    pub fn error_category(&self) -> ErrorCategory {
        if self.is_transient() {
            ErrorCategory::Transient
        } else {
            ErrorCategory::Permanent
        }
    }

    /// Whether the sender's payload, not this service, is at fault
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Delivery(_))
    }
}

fn display_discriminator(discriminator: &Option<String>) -> &str {
    discriminator.as_deref().unwrap_or("unknown")
}

/// Errors reported by a [`MessageSink`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("Delivery target temporarily unavailable: {message}")]
    Transient { message: String },

    #[error("Delivery rejected: {message}")]
    Permanent { message: String },
}

impl DeliveryError {
    /// Check if delivery error is transient
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transient { .. } => true,
            Self::Permanent { .. } => false,
        }
    }
}

// ============================================================================
// Core Operations (Traits)
// ============================================================================

/// Delivery collaborator that posts rendered notifications to a channel
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Deliver one notification
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError>;
}

// ============================================================================
// Pipeline
// ============================================================================

/// Parse a request body into a JSON object.
///
/// # Errors
///
/// [`WebhookError::MalformedPayload`] when the body is not valid JSON or the
/// top-level value is not an object.
pub fn parse_payload(body: &[u8]) -> Result<Value, WebhookError> {
    let payload: Value =
        serde_json::from_slice(body).map_err(|e| WebhookError::MalformedPayload {
            message: e.to_string(),
        })?;

    if !payload.is_object() {
        return Err(WebhookError::MalformedPayload {
            message: format!(
                "expected a JSON object, found {}",
                payload::json_kind(&payload)
            ),
        });
    }

    Ok(payload)
}

/// Classify and format a parsed payload without delivering it.
///
/// # Errors
///
/// [`WebhookError::UnsupportedEvent`] when the discriminator has no mapping,
/// [`WebhookError::FieldExtraction`] when a required field is unusable.
pub fn render_notification(
    payload: &Value,
    params: &WebhookParams,
) -> Result<(EventKind, OutboundMessage), WebhookError> {
    let kind = match classify(payload) {
        Classification::Supported(kind) => kind,
        Classification::Unsupported { discriminator } => {
            return Err(WebhookError::UnsupportedEvent { discriminator });
        }
    };

    let message = format_event(payload, kind, &params.format_options())?;

    Ok((
        kind,
        OutboundMessage {
            topic: message.topic,
            body: message.body,
            event_type: kind.as_str().to_string(),
        },
    ))
}

/// Request pipeline bound to a delivery collaborator.
///
/// Holds no per-request state; one handler can serve concurrent requests.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use onedev_relay_core::{
///     DeliveryError, MessageSink, OutboundMessage, ProcessingOutcome, WebhookHandler,
///     WebhookParams,
/// };
/// use std::sync::Arc;
///
/// struct Discard;
///
/// #[async_trait]
/// impl MessageSink for Discard {
///     async fn deliver(&self, _message: &OutboundMessage) -> Result<(), DeliveryError> {
///         Ok(())
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let handler = WebhookHandler::new(Arc::new(Discard));
/// let body = br#"{
///     "@class": "io.onedev.server.event.issue.IssueOpened",
///     "project": { "name": "try-git" },
///     "user": { "name": "john" },
///     "issue": { "number": 7, "title": "Bug X" }
/// }"#;
///
/// let outcome = handler.process(body, &WebhookParams::default()).await.unwrap();
/// let ProcessingOutcome::Delivered(message) = outcome else {
///     panic!("expected delivery");
/// };
/// assert_eq!(message.body, "john opened issue #7 Bug X.");
/// # });
/// ```
#[derive(Clone)]
pub struct WebhookHandler {
    sink: Arc<dyn MessageSink>,
    allowed_events: Option<HashSet<EventKind>>,
}

impl WebhookHandler {
    /// Create a handler that accepts every supported event kind
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self {
            sink,
            allowed_events: None,
        }
    }

    /// Restrict delivery to the given kinds. An empty set accepts every kind.
    pub fn with_allowed_events(mut self, events: impl IntoIterator<Item = EventKind>) -> Self {
        let events: HashSet<EventKind> = events.into_iter().collect();
        self.allowed_events = if events.is_empty() {
            None
        } else {
            Some(events)
        };
        self
    }

    /// Whether notifications of `kind` are delivered
    pub fn is_allowed(&self, kind: EventKind) -> bool {
        self.allowed_events
            .as_ref()
            .map_or(true, |allowed| allowed.contains(&kind))
    }

    /// Process one webhook body end to end.
    ///
    /// # Errors
    ///
    /// Any [`WebhookError`]; nothing is delivered when an error is returned
    /// before the delivery step.
    #[instrument(skip(self, body), fields(
        body_size = body.len(),
        topic_override = ?params.topic,
        branches = ?params.branches,
        event_kind
    ))]
    pub async fn process(
        &self,
        body: &[u8],
        params: &WebhookParams,
    ) -> Result<ProcessingOutcome, WebhookError> {
        let payload = parse_payload(body).inspect_err(|e| {
            warn!(error = %e, "Rejected malformed webhook body");
        })?;

        if let Some(kind) = classify(&payload).kind() {
            tracing::Span::current().record("event_kind", kind.as_str());
            if !self.is_allowed(kind) {
                info!(event_kind = %kind, "Event kind not enabled; skipping delivery");
                return Ok(ProcessingOutcome::Filtered { kind });
            }
        }

        let (kind, message) = render_notification(&payload, params).inspect_err(|e| match e {
            WebhookError::UnsupportedEvent { .. } => info!(error = %e, "Unsupported Onedev event"),
            _ => warn!(error = %e, "Could not format Onedev event"),
        })?;

        self.sink.deliver(&message).await.inspect_err(|e| {
            error!(event_kind = %kind, error = %e, "Failed to deliver notification");
        })?;

        info!(event_kind = %kind, topic = %message.topic, "Delivered notification");
        Ok(ProcessingOutcome::Delivered(message))
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
