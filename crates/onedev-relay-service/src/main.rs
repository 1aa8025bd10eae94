//! # Onedev-Relay Service
//!
//! Binary entry point for the Onedev-Relay HTTP service.
//!
//! This executable:
//! - Loads configuration from files and environment
//! - Initializes structured logging
//! - Wires the delivery sink and webhook pipeline
//! - Starts the HTTP server

use onedev_relay_service::{
    config::{LoggingConfig, CONFIG_FILE_ENV},
    start_server, AppState, ServiceConfig, ServiceError,
};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let explicit_path = std::env::var(CONFIG_FILE_ENV)
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    let service_config = match ServiceConfig::load(explicit_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&LoggingConfig::default());
            error!(
                error = %e,
                "Could not load service configuration; aborting. \
                 Fix the configuration and restart."
            );
            std::process::exit(3);
        }
    };

    init_logging(&service_config.logging);
    info!("Starting Onedev-Relay Service");

    let state = match AppState::from_config(service_config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Service configuration is invalid; aborting");
            std::process::exit(3);
        }
    };

    info!(
        host = %state.config.server.host,
        port = state.config.server.port,
        endpoint = %state.config.webhooks.endpoint_path,
        "Starting HTTP server"
    );

    if let Err(e) = start_server(state).await {
        error!("Failed to start server: {}", e);

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
        };

        std::process::exit(exit_code);
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "onedev_relay_service={level},onedev_relay_core={level},tower_http=info",
            level = config.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_format {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
