//! Compilation failures must be reported with the offending node's path

use jsonui_template::{parse_template, BuildError, CompiledTemplate};
use serde_json::json;

#[test]
fn test_unknown_kind_is_rejected() {
    let result = CompiledTemplate::compile(
        "Bogus",
        &json!({"type": "container", "children": [
            {"type": "string", "value": "ok"},
            {"type": "bogus"}
        ]}),
    );

    match result {
        Err(BuildError::UnknownKind { kind, path }) => {
            assert_eq!(kind, "bogus");
            assert_eq!(path.to_string(), "/children/1");
        }
        other => panic!("Expected UnknownKind, got {:?}", other),
    }
}

#[test]
fn test_nested_error_path() {
    let result = CompiledTemplate::compile(
        "Nested",
        &json!({"type": "condition", "condition": "$x",
                "then": {"type": "loop", "body": {"type": "string", "value": "y"}}}),
    );

    match result {
        Err(BuildError::MissingField { kind, field, path }) => {
            assert_eq!(kind, "loop");
            assert_eq!(field, "list");
            assert_eq!(path.to_string(), "/then");
        }
        other => panic!("Expected MissingField, got {:?}", other),
    }
}

#[test]
fn test_missing_kind() {
    let result = CompiledTemplate::compile("Untyped", &json!({"value": "x"}));
    assert!(matches!(result, Err(BuildError::MissingKind { .. })));
}

#[test]
fn test_non_object_node() {
    let result =
        CompiledTemplate::compile("Scalar", &json!({"type": "container", "children": ["text"]}));
    match result {
        Err(err @ BuildError::NotAnObject { .. }) => {
            assert_eq!(err.path().map(ToString::to_string).as_deref(), Some("/children/0"));
        }
        other => panic!("Expected NotAnObject, got {:?}", other),
    }
}

#[test]
fn test_malformed_binding() {
    let result =
        CompiledTemplate::compile("Spaces", &json!({"type": "string", "value": "$user. name"}));
    assert!(matches!(result, Err(BuildError::MalformedBinding { .. })));

    let result = CompiledTemplate::compile("Empty", &json!({"type": "string", "value": "$"}));
    assert!(matches!(result, Err(BuildError::MalformedBinding { .. })));
}

#[test]
fn test_invalid_json_text() {
    assert!(matches!(parse_template("{\"type\": "), Err(BuildError::Json(_))));
}

#[test]
fn test_string_without_value() {
    let result = CompiledTemplate::compile_str("NoValue", r#"{"type": "string"}"#);
    assert!(matches!(
        result,
        Err(BuildError::MissingField { kind: "string", field: "value", .. })
    ));
}

#[test]
fn test_loop_with_list_and_count() {
    let result = CompiledTemplate::compile(
        "Ambiguous",
        &json!({"type": "container", "children": [
            {"type": "loop", "list": "$rows", "count": 2, "body": {"type": "string", "value": "x"}}
        ]}),
    );

    match result {
        Err(BuildError::InvalidField { field, path, .. }) => {
            assert_eq!(field, "count");
            assert_eq!(path.to_string(), "/children/0");
        }
        other => panic!("Expected InvalidField, got {:?}", other),
    }
}
