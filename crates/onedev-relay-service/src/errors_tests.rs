//! Tests for HTTP error mapping.

use super::*;
use onedev_relay_core::{DeliveryError, FieldExtractionError};

fn handler_error(error: WebhookError) -> WebhookHandlerError {
    WebhookHandlerError::from(error)
}

#[test]
fn test_unsupported_event_maps_to_bad_request() {
    let error = handler_error(WebhookError::UnsupportedEvent {
        discriminator: Some("io.onedev.server.event.project.CommitAware".to_string()),
    });

    assert_eq!(
        error.classify(),
        (StatusCode::BAD_REQUEST, UNSUPPORTED_EVENT_CODE, false)
    );
    assert_eq!(
        error.to_string(),
        "The 'io.onedev.server.event.project.CommitAware' event isn't currently supported by the Onedev webhook"
    );
}

#[test]
fn test_missing_discriminator_is_named_unknown() {
    let error = handler_error(WebhookError::UnsupportedEvent {
        discriminator: None,
    });

    assert!(error.to_string().contains("'unknown'"));
}

#[test]
fn test_payload_errors_map_to_bad_request() {
    let field = handler_error(WebhookError::FieldExtraction(
        FieldExtractionError::MissingField {
            path: "project.name".to_string(),
        },
    ));
    let malformed = handler_error(WebhookError::MalformedPayload {
        message: "expected object".to_string(),
    });

    assert_eq!(
        field.classify(),
        (StatusCode::BAD_REQUEST, BAD_REQUEST_CODE, false)
    );
    assert_eq!(
        malformed.classify(),
        (StatusCode::BAD_REQUEST, BAD_REQUEST_CODE, false)
    );
}

#[test]
fn test_delivery_errors_map_by_transience() {
    let transient = handler_error(WebhookError::Delivery(DeliveryError::Transient {
        message: "timeout".to_string(),
    }));
    let permanent = handler_error(WebhookError::Delivery(DeliveryError::Permanent {
        message: "forbidden".to_string(),
    }));

    assert_eq!(
        transient.classify(),
        (StatusCode::SERVICE_UNAVAILABLE, DELIVERY_FAILED_CODE, true)
    );
    assert_eq!(
        permanent.classify(),
        (StatusCode::BAD_GATEWAY, DELIVERY_FAILED_CODE, false)
    );
}

#[test]
fn test_retryable_response_carries_retry_after() {
    let response = handler_error(WebhookError::Delivery(DeliveryError::Transient {
        message: "timeout".to_string(),
    }))
    .into_response();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers().get("retry-after").unwrap(), "60");
}

#[test]
fn test_client_error_response_has_no_retry_after() {
    let response = handler_error(WebhookError::UnsupportedEvent {
        discriminator: None,
    })
    .into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get("retry-after").is_none());
}

#[test]
fn test_config_error_converts_to_service_error() {
    let error: ServiceError = ConfigError::Missing {
        key: "delivery.url".to_string(),
    }
    .into();

    assert!(matches!(error, ServiceError::Configuration(_)));
    assert!(error.to_string().contains("delivery.url"));
}
