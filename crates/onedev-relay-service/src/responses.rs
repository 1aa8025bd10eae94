//! Response and query parameter types for the HTTP API.

use serde::{Deserialize, Serialize};

/// Response returned for every accepted webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub result: String,
    pub msg: String,
}

impl SuccessResponse {
    pub fn new() -> Self {
        Self {
            result: "success".to_string(),
            msg: String::new(),
        }
    }
}

impl Default for SuccessResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Query parameters accepted on the webhook endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookQuery {
    /// Topic that replaces the computed one
    pub topic: Option<String>,

    /// Branch filter, accepted but not applied
    pub branches: Option<String>,
}
