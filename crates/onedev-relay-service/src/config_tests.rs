//! Tests for service configuration.

use super::*;
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_default_configuration_is_valid() {
    let config = ServiceConfig::default();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.webhooks.endpoint_path, "/api/v1/external/onedev");
    assert!(config.webhooks.allowed_event_types.is_empty());
    assert!(!config.webhooks.include_title);
    assert_eq!(config.delivery, DeliveryConfig::Log);
    assert_eq!(config.logging.level, "info");
    assert!(config.validate().is_ok());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_endpoint_path_must_be_absolute() {
    let mut config = ServiceConfig::default();
    config.webhooks.endpoint_path = "hooks/onedev".to_string();

    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { .. })
    ));
}

#[test]
fn test_empty_host_is_reported_missing() {
    let mut config = ServiceConfig::default();
    config.server.host = String::new();

    match config.validate() {
        Err(ConfigError::Missing { key }) => assert_eq!(key, "server.host"),
        other => panic!("expected missing host, got {other:?}"),
    }
}

#[test]
fn test_zero_body_limit_is_rejected() {
    let mut config = ServiceConfig::default();
    config.server.max_body_size = 0;

    assert!(config.validate().is_err());
}

#[test]
fn test_http_delivery_requires_valid_url() {
    let mut config = ServiceConfig::default();
    config.delivery = DeliveryConfig::Http {
        url: "not a url".to_string(),
        timeout_seconds: 10,
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { .. })
    ));

    config.delivery = DeliveryConfig::Http {
        url: String::new(),
        timeout_seconds: 10,
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Missing { .. })
    ));

    config.delivery = DeliveryConfig::Http {
        url: "http://localhost:9000/notify".to_string(),
        timeout_seconds: 0,
    };
    assert!(config.validate().is_err());
}

// ============================================================================
// Event allow list
// ============================================================================

#[test]
fn test_allowed_events_parse_event_kind_names() {
    let webhooks = WebhookConfig {
        allowed_event_types: vec![
            "issue_opened".to_string(),
            "pull_request_changed".to_string(),
        ],
        ..WebhookConfig::default()
    };

    assert_eq!(
        webhooks.allowed_events().unwrap(),
        vec![EventKind::IssueOpened, EventKind::PullRequestChanged]
    );
}

#[test]
fn test_unknown_allowed_event_is_rejected() {
    let webhooks = WebhookConfig {
        allowed_event_types: vec!["build_finished".to_string()],
        ..WebhookConfig::default()
    };

    let error = webhooks.allowed_events().unwrap_err();
    assert!(error.to_string().contains("build_finished"));
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_from_explicit_file() {
    let file = write_config(
        r#"
server:
  port: 9191
webhooks:
  include_title: true
  allowed_event_types:
    - pull_request_opened
delivery:
  type: http
  url: "http://localhost:9000/notify"
logging:
  json_format: true
"#,
    );

    let config = ServiceConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.server.port, 9191);
    assert_eq!(config.server.host, "0.0.0.0");
    assert!(config.webhooks.include_title);
    assert_eq!(
        config.webhooks.allowed_event_types,
        vec!["pull_request_opened".to_string()]
    );
    assert_eq!(
        config.delivery,
        DeliveryConfig::Http {
            url: "http://localhost:9000/notify".to_string(),
            timeout_seconds: 10,
        }
    );
    assert!(config.logging.json_format);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");

    assert!(matches!(
        ServiceConfig::load(Some(&missing)),
        Err(ConfigError::Load(_))
    ));
}

#[test]
fn test_load_malformed_file_fails() {
    let file = write_config("server: [unterminated\n");

    assert!(ServiceConfig::load(Some(file.path())).is_err());
}
