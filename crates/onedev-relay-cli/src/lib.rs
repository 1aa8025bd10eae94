//! # Onedev-Relay CLI
//!
//! Command-line interface for Onedev-Relay.
//!
//! This module provides CLI commands for:
//! - Classifying a saved webhook payload
//! - Rendering the notification a payload would produce
//! - Validating and displaying the service configuration
//!
//! Commands never deliver anything; they are meant for checking payloads and
//! configuration before pointing Onedev at a running service.

use clap::{Parser, Subcommand};
use onedev_relay_core::{
    classify, parse_payload, render_notification, Classification, WebhookError, WebhookParams,
};
use onedev_relay_service::{config::CONFIG_FILE_ENV, ConfigError, ServiceConfig};
use serde::Serialize;
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

// ============================================================================
// CLI Structure
// ============================================================================

/// Onedev-Relay CLI - Onedev webhooks as chat notifications
#[derive(Parser)]
#[command(name = "onedev-relay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect Onedev webhook payloads and relay configuration")]
pub struct Cli {
    /// Logging level
    #[arg(short, long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Report which event a payload file represents
    Classify {
        /// JSON payload file
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Render the topic and body a payload file would produce
    Render {
        /// JSON payload file
        file: PathBuf,

        /// Topic that replaces the computed one
        #[arg(short, long)]
        topic: Option<String>,

        /// Include the pull request title in pull request bodies
        #[arg(long)]
        include_title: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Validate configuration
    Config {
        /// Configuration file to validate
        #[arg(short, long, env = "ONEDEV_RELAY_CONFIG_FILE")]
        file: Option<PathBuf>,

        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,
    },
}

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

// ============================================================================
// CLI Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("{0}")]
    Processing(#[from] WebhookError),

    #[error("Failed to serialize output: {message}")]
    Serialization { message: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl CliError {
    fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Machine-readable result of `classify`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationReport {
    pub supported: bool,
    pub event_type: Option<String>,
    pub discriminator: Option<String>,
}

impl From<Classification> for ClassificationReport {
    fn from(classification: Classification) -> Self {
        match classification {
            Classification::Supported(kind) => Self {
                supported: true,
                event_type: Some(kind.as_str().to_string()),
                discriminator: Some(kind.discriminator().to_string()),
            },
            Classification::Unsupported { discriminator } => Self {
                supported: false,
                event_type: None,
                discriminator,
            },
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Main CLI entry point
pub fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    initialize_logging(&cli);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli.command, &mut out)
}

/// Run one command, writing its report to `out`
pub fn execute(command: Commands, out: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Commands::Classify { file, format } => execute_classify_command(&file, format, out),
        Commands::Render {
            file,
            topic,
            include_title,
            format,
        } => execute_render_command(&file, topic, include_title, format, out),
        Commands::Config { file, show } => execute_config_command(file.as_deref(), show, out),
    }
}

/// Logs go to stderr so command output stays machine-readable
fn initialize_logging(cli: &Cli) {
    let filter = tracing_subscriber::EnvFilter::try_new(&cli.log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    // A subscriber may already be installed when embedded; keep it.
    let _ = if cli.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

// ============================================================================
// Command Implementations
// ============================================================================

fn execute_classify_command(
    file: &Path,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    info!(file = %file.display(), "Classifying payload");

    let payload = parse_payload(&read_payload(file)?)?;
    let report = ClassificationReport::from(classify(&payload));

    match format {
        OutputFormat::Text => {
            let line = match (&report.event_type, &report.discriminator) {
                (Some(event_type), Some(discriminator)) => {
                    format!("{event_type} ({discriminator})")
                }
                (_, discriminator) => format!(
                    "unsupported ({})",
                    discriminator.as_deref().unwrap_or("unknown")
                ),
            };
            writeln!(out, "{line}").map_err(|e| CliError::io("Failed to write output", e))
        }
        OutputFormat::Json => write_json(&report, out),
    }
}

fn execute_render_command(
    file: &Path,
    topic: Option<String>,
    include_title: bool,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    info!(
        file = %file.display(),
        topic = ?topic,
        include_title = include_title,
        "Rendering payload"
    );

    let payload = parse_payload(&read_payload(file)?)?;
    let params = WebhookParams {
        topic,
        branches: None,
        include_title,
    };
    let (kind, message) = render_notification(&payload, &params)?;
    debug!(event_type = %kind, "Payload rendered");

    match format {
        OutputFormat::Text => write!(
            out,
            "Event: {}\nTopic: {}\n\n{}\n",
            message.event_type, message.topic, message.body
        )
        .map_err(|e| CliError::io("Failed to write output", e)),
        OutputFormat::Json => write_json(&message, out),
    }
}

fn execute_config_command(
    file: Option<&Path>,
    show: bool,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    info!(file = ?file, env = CONFIG_FILE_ENV, show = show, "Validating configuration");

    let config = ServiceConfig::load(file)?;
    config.validate()?;

    if show {
        let yaml = serde_yaml::to_string(&config).map_err(|e| CliError::Serialization {
            message: e.to_string(),
        })?;
        write!(out, "{yaml}").map_err(|e| CliError::io("Failed to write output", e))?;
    } else {
        writeln!(out, "Configuration is valid")
            .map_err(|e| CliError::io("Failed to write output", e))?;
    }

    Ok(())
}

fn read_payload(file: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(file).map_err(|e| CliError::io(format!("Failed to read {}", file.display()), e))
}

fn write_json<T: Serialize>(value: &T, out: &mut dyn Write) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError::Serialization {
        message: e.to_string(),
    })?;
    writeln!(out, "{json}").map_err(|e| CliError::io("Failed to write output", e))
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
