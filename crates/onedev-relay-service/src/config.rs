//! Configuration types for the HTTP service
//!
//! Sources, applied in order (later sources override earlier ones):
//!  1. `/etc/onedev-relay/service.yaml`  system-wide defaults
//!  2. `./config/service.yaml`           deployment-local override
//!  3. an explicit file (`ONEDEV_RELAY_CONFIG_FILE`)
//!  4. environment variables prefixed `ONEDEV_RELAY__`, with `__` between
//!     levels, e.g. `ONEDEV_RELAY__SERVER__PORT=9090`
//!
//! Every field has a default, so an unconfigured environment yields a valid
//! configuration that logs notifications instead of forwarding them.

use crate::errors::ConfigError;
use onedev_relay_core::EventKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment variable naming an explicit configuration file
pub const CONFIG_FILE_ENV: &str = "ONEDEV_RELAY_CONFIG_FILE";

/// Prefix for configuration environment variables
pub const ENV_PREFIX: &str = "ONEDEV_RELAY";

/// Service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Webhook processing settings
    pub webhooks: WebhookConfig,

    /// Where rendered notifications go
    pub delivery: DeliveryConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from the standard sources plus an optional
    /// explicit file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Load`] when a file is malformed, the explicit file is
    /// missing, or a value cannot be coerced to its field type.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(
                config::File::with_name("/etc/onedev-relay/service")
                    .required(false)
                    .format(config::FileFormat::Yaml),
            )
            .add_source(
                config::File::with_name("config/service")
                    .required(false)
                    .format(config::FileFormat::Yaml),
            );

        if let Some(path) = explicit_path {
            info!(path = %path.display(), "Loading configuration from explicit path");
            builder = builder.add_source(
                config::File::from(path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
        }

        let config = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.webhooks.validate()?;
        self.delivery.validate()?;
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Maximum request size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_seconds: 30,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Missing {
                key: "server.host".to_string(),
            });
        }
        if self.max_body_size == 0 {
            return Err(ConfigError::Invalid {
                message: "server.max_body_size must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Webhook processing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Webhook endpoint path
    pub endpoint_path: String,

    /// Event kinds that produce notifications (empty = all)
    pub allowed_event_types: Vec<String>,

    /// Include the pull request title in pull request bodies
    pub include_title: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            endpoint_path: "/api/v1/external/onedev".to_string(),
            allowed_event_types: vec![], // All events allowed by default
            include_title: false,
        }
    }
}

impl WebhookConfig {
    /// Parse `allowed_event_types` into event kinds
    pub fn allowed_events(&self) -> Result<Vec<EventKind>, ConfigError> {
        self.allowed_event_types
            .iter()
            .map(|name| {
                name.parse::<EventKind>()
                    .map_err(|e| ConfigError::Invalid {
                        message: format!("webhooks.allowed_event_types: {e}"),
                    })
            })
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.endpoint_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                message: format!(
                    "webhooks.endpoint_path '{}' must start with '/'",
                    self.endpoint_path
                ),
            });
        }
        self.allowed_events()?;
        Ok(())
    }
}

/// Delivery target for rendered notifications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum DeliveryConfig {
    /// Write notifications to the log only
    #[default]
    Log,

    /// POST each notification as JSON to `url`
    Http {
        url: String,
        #[serde(default = "default_delivery_timeout")]
        timeout_seconds: u64,
    },
}

fn default_delivery_timeout() -> u64 {
    10
}

impl DeliveryConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Log => Ok(()),
            Self::Http {
                url,
                timeout_seconds,
            } => {
                if url.is_empty() {
                    return Err(ConfigError::Missing {
                        key: "delivery.url".to_string(),
                    });
                }
                reqwest::Url::parse(url).map_err(|e| ConfigError::Invalid {
                    message: format!("delivery.url '{url}' is not a valid URL: {e}"),
                })?;
                if *timeout_seconds == 0 {
                    return Err(ConfigError::Invalid {
                        message: "delivery.timeout_seconds must be greater than zero".to_string(),
                    });
                }
                Ok(())
            }
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
