//! Tests for [`Payload`] field accessors.

use super::*;
use serde_json::json;

fn sample() -> Value {
    json!({
        "@class": "io.onedev.server.event.issue.IssueOpened",
        "project": { "name": "try-git", "id": 3 },
        "issue": {
            "number": 7,
            "title": "Bug X",
            "description": null,
            "votes": 1.5,
        },
        "change": { "data": { "@type": "IssueStateChangeData" } },
        "tags": ["a", "b"],
    })
}

mod required_fields {
    use super::*;

    #[test]
    fn test_get_str_reads_nested_value() {
        let value = sample();
        let payload = Payload::new(&value);

        assert_eq!(payload.get_str("project.name").unwrap(), "try-git");
    }

    #[test]
    fn test_get_str_reads_keys_with_at_sign() {
        let value = sample();
        let payload = Payload::new(&value);

        assert_eq!(
            payload.get_str("change.data.@type").unwrap(),
            "IssueStateChangeData"
        );
        assert_eq!(
            payload.get_str("@class").unwrap(),
            "io.onedev.server.event.issue.IssueOpened"
        );
    }

    #[test]
    fn test_get_int_reads_integer() {
        let value = sample();
        let payload = Payload::new(&value);

        assert_eq!(payload.get_int("issue.number").unwrap(), 7);
    }

    #[test]
    fn test_missing_key_reports_full_path() {
        let value = sample();
        let payload = Payload::new(&value);

        let err = payload.get_str("issue.assignee.name").unwrap_err();
        assert_eq!(
            err,
            FieldExtractionError::MissingField {
                path: "issue.assignee.name".to_string()
            }
        );
        assert_eq!(err.path(), "issue.assignee.name");
    }

    #[test]
    fn test_int_where_string_expected_is_type_error() {
        let value = sample();
        let payload = Payload::new(&value);

        let err = payload.get_str("issue.number").unwrap_err();
        assert_eq!(
            err,
            FieldExtractionError::InvalidType {
                path: "issue.number".to_string(),
                expected: "string",
                found: "integer",
            }
        );
    }

    #[test]
    fn test_string_where_int_expected_is_type_error() {
        let value = sample();
        let payload = Payload::new(&value);

        let err = payload.get_int("issue.title").unwrap_err();
        assert!(
            matches!(
                err,
                FieldExtractionError::InvalidType {
                    expected: "integer",
                    found: "string",
                    ..
                }
            ),
            "expected InvalidType, got: {err:?}"
        );
    }

    #[test]
    fn test_float_is_not_an_integer() {
        let value = sample();
        let payload = Payload::new(&value);

        let err = payload.get_int("issue.votes").unwrap_err();
        assert!(matches!(
            err,
            FieldExtractionError::InvalidType { found: "float", .. }
        ));
    }

    #[test]
    fn test_null_is_not_a_required_string() {
        let value = sample();
        let payload = Payload::new(&value);

        let err = payload.get_str("issue.description").unwrap_err();
        assert!(matches!(
            err,
            FieldExtractionError::InvalidType { found: "null", .. }
        ));
    }

    #[test]
    fn test_traversing_through_a_scalar_is_missing_field() {
        let value = sample();
        let payload = Payload::new(&value);

        let err = payload.get_str("project.name.first").unwrap_err();
        assert!(matches!(err, FieldExtractionError::MissingField { .. }));
    }

    #[test]
    fn test_arrays_are_not_indexed_by_path() {
        let value = sample();
        let payload = Payload::new(&value);

        assert!(payload.get_optional_at("tags.0").is_none());
    }
}

mod optional_fields {
    use super::*;

    #[test]
    fn test_optional_str_null_is_none() {
        let value = sample();
        let payload = Payload::new(&value);

        assert_eq!(payload.get_optional_str("issue.description").unwrap(), None);
    }

    #[test]
    fn test_optional_str_absent_is_none() {
        let value = sample();
        let payload = Payload::new(&value);

        assert_eq!(payload.get_optional_str("issue.milestone").unwrap(), None);
    }

    #[test]
    fn test_optional_str_present_is_some() {
        let value = sample();
        let payload = Payload::new(&value);

        assert_eq!(
            payload.get_optional_str("issue.title").unwrap(),
            Some("Bug X")
        );
    }

    #[test]
    fn test_optional_str_with_wrong_kind_is_error() {
        let value = sample();
        let payload = Payload::new(&value);

        let err = payload.get_optional_str("project").unwrap_err();
        assert_eq!(
            err,
            FieldExtractionError::InvalidType {
                path: "project".to_string(),
                expected: "string or null",
                found: "object",
            }
        );
    }
}

#[test]
fn test_error_messages_name_the_path() {
    let err = FieldExtractionError::InvalidType {
        path: "request.number".to_string(),
        expected: "integer",
        found: "string",
    };
    assert_eq!(
        err.to_string(),
        "Invalid field type at request.number: expected integer, found string"
    );
}
