//! # Onedev-Relay Core
//!
//! Core logic for turning Onedev webhook notifications into chat messages.
//!
//! This crate contains the event classification and message formatting engine.
//! Given the JSON body of a Onedev webhook it:
//! - Determines which supported event occurred (see [`webhook::classifier`])
//! - Extracts the required fields through fallible typed accessors (see [`webhook::payload`])
//! - Renders a topic and a message body per event kind (see [`webhook::formatter`])
//! - Hands the result to a [`webhook::MessageSink`] supplied by the host
//!
//! HTTP handling and the concrete delivery target live in the service crate.
//!
//! ## Usage
//!
//! ```rust
//! use onedev_relay_core::{classify, format_event, Classification, FormatOptions};
//! use serde_json::json;
//!
//! let payload = json!({
//!     "@class": "io.onedev.server.event.issue.IssueOpened",
//!     "project": { "name": "try-git" },
//!     "user": { "name": "john" },
//!     "issue": { "number": 7, "title": "Bug X", "description": "steps..." },
//! });
//!
//! let Classification::Supported(kind) = classify(&payload) else {
//!     panic!("expected a supported event");
//! };
//! let message = format_event(&payload, kind, &FormatOptions::default()).unwrap();
//! assert_eq!(message.topic, "try-git / issue #7 Bug X");
//! ```

use serde::{Deserialize, Serialize};

pub mod webhook;

pub use webhook::{
    classifier::{classify, Classification, EventKind},
    formatter::{format_event, FormatOptions, NotificationMessage},
    link_repair::repair_placeholder_links,
    parse_payload,
    payload::{FieldExtractionError, Payload},
    render_notification, DeliveryError, MessageSink, OutboundMessage, ProcessingOutcome,
    WebhookError, WebhookHandler, WebhookParams,
};

/// Standard result type for onedev-relay operations
pub type RelayResult<T> = Result<T, WebhookError>;

// ============================================================================
// Error Types
// ============================================================================

/// High-level error categorization for retry and alerting decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Temporary failures that the sender may retry
    Transient,
    /// Permanent failures that won't succeed on retry
    Permanent,
}

impl ErrorCategory {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
