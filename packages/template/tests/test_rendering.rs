//! End-to-end rendering of compiled templates into documents

use jsonui_template::{CompiledTemplate, RenderEnv, RenderError};
use serde_json::{json, Value};

fn render(template: Value, values: Value) -> Value {
    let template = CompiledTemplate::compile("Test", &template).expect("compile failed");
    template
        .render_document(&RenderEnv::new(), values)
        .expect("render failed")
}

#[test]
fn test_container_scenario() {
    let template = CompiledTemplate::compile(
        "Scenario",
        &json!({
            "type": "container",
            "children": [
                {"type": "string", "value": "A"},
                {"type": "condition", "condition": "$flag",
                 "then": {"type": "string", "value": "B"},
                 "else": {"type": "string", "value": "C"}}
            ]
        }),
    )
    .unwrap();

    assert_eq!(template.element_count(), 4);

    let env = RenderEnv::new();
    let on = template.render_document(&env, json!({"flag": true})).unwrap();
    let off = template.render_document(&env, json!({"flag": false})).unwrap();
    assert_eq!(on["strings"], json!(["A", "B"]));
    assert_eq!(off["strings"], json!(["A", "C"]));
}

#[test]
fn test_condition_truthiness() {
    let template = json!({
        "type": "condition", "condition": "$items",
        "then": {"type": "string", "value": "some"},
        "else": {"type": "string", "value": "none"}
    });

    assert_eq!(render(template.clone(), json!({"items": [1]}))["strings"], json!(["some"]));
    assert_eq!(render(template.clone(), json!({"items": []}))["strings"], json!(["none"]));
    assert_eq!(render(template.clone(), json!({"items": null}))["strings"], json!(["none"]));
    assert_eq!(render(template, json!({"items": "x"}))["strings"], json!(["some"]));
}

#[test]
fn test_condition_compare_mode() {
    let template = json!({
        "type": "condition", "condition": "$status", "value": "open",
        "then": {"type": "string", "value": "open"},
        "else": {"type": "string", "value": "closed"}
    });

    assert_eq!(render(template.clone(), json!({"status": "open"}))["strings"], json!(["open"]));
    assert_eq!(render(template, json!({"status": "done"}))["strings"], json!(["closed"]));
}

#[test]
fn test_condition_compare_numbers_structurally() {
    let template = json!({
        "type": "condition", "condition": "$count", "value": 1,
        "then": {"type": "string", "value": "one"}
    });

    assert_eq!(render(template.clone(), json!({"count": 1.0}))["strings"], json!(["one"]));
    assert_eq!(render(template, json!({"count": 2}))["strings"], json!([]));
}

#[test]
fn test_negated_condition_without_else_renders_nothing() {
    let template = json!({
        "type": "condition", "condition": "$hidden", "negate": true,
        "then": {"type": "string", "value": "shown"}
    });

    assert_eq!(render(template.clone(), json!({"hidden": false}))["strings"], json!(["shown"]));
    let doc = render(template, json!({"hidden": true}));
    assert_eq!(doc["strings"], json!([]));
    assert_eq!(doc["loops"], json!({}));
}

#[test]
fn test_loop_produces_one_entry_per_item() {
    let doc = render(
        json!({
            "type": "loop", "list": "$rows", "item": "row", "key": "rows",
            "body": {"type": "string", "value": "$row.title"}
        }),
        json!({"rows": [{"title": "a"}, {"title": "b"}, {"title": "c"}]}),
    );

    let rows = doc["loops"]["rows"].as_array().expect("loop entries");
    assert_eq!(rows.len(), 3);
    let titles: Vec<&str> = rows.iter().filter_map(|row| row["strings"][0].as_str()).collect();
    assert_eq!(titles, vec!["a", "b", "c"]);
    // Iteration output stays inside the loop entry
    assert_eq!(doc["strings"], json!([]));
}

#[test]
fn test_empty_loop_still_publishes_key() {
    let doc = render(
        json!({
            "type": "loop", "list": "$rows", "key": "rows",
            "body": {"type": "string", "value": "x"}
        }),
        json!({"rows": []}),
    );
    assert_eq!(doc["loops"]["rows"], json!([]));
}

#[test]
fn test_nested_loops_see_outer_item() {
    let doc = render(
        json!({
            "type": "loop", "list": "$groups", "item": "group", "key": "groups",
            "body": {
                "type": "loop", "list": "$group.members", "item": "member", "key": "members",
                "body": {
                    "type": "container",
                    "children": [
                        {"type": "string", "value": "$group.name"},
                        {"type": "string", "value": "$member"}
                    ]
                }
            }
        }),
        json!({"groups": [{"name": "core", "members": ["ada", "alan"]}]}),
    );

    let members = &doc["loops"]["groups"][0]["loops"]["members"];
    assert_eq!(members[0]["strings"], json!(["core", "ada"]));
    assert_eq!(members[1]["strings"], json!(["core", "alan"]));
}

#[test]
fn test_loop_index_and_start_index() {
    let doc = render(
        json!({
            "type": "foreach", "list": "$names", "item": "name", "index": "n", "startIndex": 1,
            "identifier": "names",
            "contents": {"type": "string", "value": "$n"}
        }),
        json!({"names": ["x", "y"]}),
    );

    let names = doc["loops"]["names"].as_array().unwrap();
    assert_eq!(names[0]["strings"], json!(["1"]));
    assert_eq!(names[1]["strings"], json!(["2"]));
}

#[test]
fn test_labels_and_values() {
    let template = CompiledTemplate::compile(
        "Labels",
        &json!({
            "type": "container",
            "children": [
                {"type": "string", "value": {"type": "label", "value": "greeting"}},
                {"type": "string", "value": "$user.name", "key": "user"}
            ]
        }),
    )
    .unwrap();

    let env = RenderEnv::new().with_label("greeting", "Welcome");
    let doc = template
        .render_document(&env, json!({"user": {"name": "Ada"}}))
        .unwrap();

    assert_eq!(doc["strings"], json!(["Welcome", "Ada"]));
    assert_eq!(doc["labels"], json!({"greeting": "Welcome"}));
    assert_eq!(doc["values"], json!({"user": "Ada"}));
}

#[test]
fn test_missing_label_in_strict_mode_fails() {
    let template = CompiledTemplate::compile(
        "Labels",
        &json!({"type": "string", "value": {"type": "label", "value": "missing"}}),
    )
    .unwrap();

    let lenient = template.render_document(&RenderEnv::new(), json!({})).unwrap();
    assert_eq!(lenient["strings"], json!(["missing"]));

    let strict = RenderEnv::new().with_strict_labels(true);
    assert!(matches!(
        template.render_document(&strict, json!({})),
        Err(RenderError::LabelNotFound { key }) if key == "missing"
    ));
}

#[test]
fn test_inputs() {
    let doc = render(
        json!({
            "type": "input",
            "attributes": {
                "type": "checkbox", "name": "archived", "value": "$archived", "disabled": false
            }
        }),
        json!({"archived": true}),
    );

    assert_eq!(
        doc["inputs"],
        json!([{"disabled": false, "name": "archived", "type": "checkbox", "value": true}])
    );
    assert_eq!(doc["values"]["archived"], json!(true));
}

#[test]
fn test_html_is_escaped_unless_disabled() {
    let doc = render(
        json!({
            "type": "container",
            "children": [
                {"type": "string", "value": "$body"},
                {"type": "string", "value": "$body", "escapeHTML": false}
            ]
        }),
        json!({"body": "<a href=\"#\">x</a>"}),
    );

    assert_eq!(doc["strings"][0], json!("&lt;a href=&quot;#&quot;&gt;x&lt;/a&gt;"));
    assert_eq!(doc["strings"][1], json!("<a href=\"#\">x</a>"));
}

#[test]
fn test_binding_failure_aborts_render() {
    let template = CompiledTemplate::compile(
        "Broken",
        &json!({
            "type": "container",
            "children": [
                {"type": "string", "value": "before"},
                {"type": "string", "value": "$user.email"}
            ]
        }),
    )
    .unwrap();

    match template.render_document(&RenderEnv::new(), json!({"user": {"name": "Ada"}})) {
        Err(RenderError::BindingNotFound { binding, key }) => {
            assert_eq!(binding, "user.email");
            assert_eq!(key, "email");
        }
        other => panic!("Expected BindingNotFound, got {:?}", other),
    }
}

#[test]
fn test_binding_failure_inside_loop_propagates() {
    let template = CompiledTemplate::compile(
        "Broken",
        &json!({
            "type": "loop", "list": "$rows", "item": "row",
            "body": {"type": "string", "value": "$row.title"}
        }),
    )
    .unwrap();

    let result = template.render_document(&RenderEnv::new(), json!({"rows": [{"title": "a"}, {}]}));
    assert!(matches!(result, Err(RenderError::BindingNotFound { .. })));
}

#[test]
fn test_escaped_dollar_renders_literally() {
    let doc = render(json!({"type": "string", "value": "$$5"}), json!({}));
    assert_eq!(doc["strings"], json!(["$5"]));
}

#[test]
fn test_compare_mode_large_integer_ids() {
    let template = json!({
        "type": "condition", "condition": "$a", "value": "$b",
        "then": {"type": "string", "value": "same"},
        "else": {"type": "string", "value": "different"}
    });

    let doc = render(
        template.clone(),
        json!({"a": 9_007_199_254_740_993u64, "b": 9_007_199_254_740_992u64}),
    );
    assert_eq!(doc["strings"], json!(["different"]));

    let doc = render(template.clone(), json!({"a": u64::MAX, "b": u64::MAX - 1}));
    assert_eq!(doc["strings"], json!(["different"]));

    let doc = render(template, json!({"a": u64::MAX, "b": u64::MAX}));
    assert_eq!(doc["strings"], json!(["same"]));
}

#[test]
fn test_count_loop_above_limit_fails() {
    let template = CompiledTemplate::compile(
        "Counted",
        &json!({
            "type": "loop", "count": "$n", "key": "rows",
            "body": {"type": "string", "value": "x"}
        }),
    )
    .unwrap();

    match template.render_document(&RenderEnv::new(), json!({"n": u64::MAX})) {
        Err(RenderError::LoopLimitExceeded { count, limit, .. }) => {
            assert_eq!(count, u64::MAX);
            assert_eq!(limit, jsonui_template::DEFAULT_MAX_LOOP_COUNT);
        }
        other => panic!("Expected LoopLimitExceeded, got {:?}", other),
    }

    let env = RenderEnv::new().with_max_loop_count(3);
    assert!(template.render_document(&env, json!({"n": 4})).is_err());
    let doc = template.render_document(&env, json!({"n": 3})).unwrap();
    assert_eq!(doc["loops"]["rows"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_loop_index_overflow_fails() {
    let template = CompiledTemplate::compile(
        "Overflow",
        &json!({
            "type": "loop", "list": "$rows", "index": "i", "startIndex": i64::MAX,
            "body": {"type": "string", "value": "$i"}
        }),
    )
    .unwrap();

    match template.render_document(&RenderEnv::new(), json!({"rows": [1, 2]})) {
        Err(RenderError::IndexOverflow { index, start_index, position }) => {
            assert_eq!(index, "i");
            assert_eq!(start_index, i64::MAX);
            assert_eq!(position, 1);
        }
        other => panic!("Expected IndexOverflow, got {:?}", other),
    }
}

#[test]
fn test_loop_separator_between_iterations() {
    let doc = render(
        json!({
            "type": "loop", "list": "$tags", "item": "tag", "key": "tags", "separator": ", ",
            "body": {"type": "string", "value": "$tag"}
        }),
        json!({"tags": ["rust", "json", "ui"]}),
    );

    let tags = doc["loops"]["tags"].as_array().unwrap();
    assert_eq!(tags[0]["strings"], json!(["rust"]));
    assert_eq!(tags[1]["strings"], json!([", ", "json"]));
    assert_eq!(tags[2]["strings"], json!([", ", "ui"]));
}
