//! # Template Nodes
//!
//! Validated form of a JSON template. Every node is an object with a `type`
//! discriminant:
//!
//! ```json
//! {
//!   "type": "container",
//!   "children": [
//!     { "type": "string", "value": "Hello " },
//!     { "type": "string", "value": "$user.name" },
//!     { "type": "condition", "condition": "$user.admin",
//!       "then": { "type": "string", "value": "(admin)" } },
//!     { "type": "loop", "list": "$mails", "item": "mail",
//!       "body": { "type": "string", "value": "$mail.subject" } },
//!     { "type": "input", "attributes": { "type": "text", "name": "q", "value": "$query" } },
//!     { "type": "component", "name": "Footer", "bindings": { "year": "$year" } }
//!   ]
//! }
//! ```
//!
//! Validation failures carry the path of the offending node.

use crate::binding::Association;
use crate::error::{BuildError, BuildResult, NodePath};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    String(StringNode),
    Input(InputNode),
    Condition(ConditionNode),
    Loop(LoopNode),
    Container(ContainerNode),
    Component(ComponentNode),
    Content(ContentNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringNode {
    pub path: NodePath,
    pub value: Association,
    pub escape_html: bool,
    /// Also publish the rendered value under this key
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputNode {
    pub path: NodePath,
    pub attributes: BTreeMap<String, Association>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionNode {
    pub path: NodePath,
    pub condition: Option<Association>,
    pub value: Option<Association>,
    pub then_branch: Option<Box<TemplateNode>>,
    pub else_branch: Option<Box<TemplateNode>>,
    pub negate: bool,
    pub name: Option<String>,
}

/// Where a loop takes its iterations from
#[derive(Debug, Clone, PartialEq)]
pub enum LoopSource {
    List(Association),
    Count(Association),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopNode {
    pub path: NodePath,
    pub source: LoopSource,
    pub body: Box<TemplateNode>,
    pub item: String,
    pub index: Option<String>,
    pub start_index: i64,
    pub key: Option<String>,
    /// Text rendered between iterations
    pub separator: Option<Association>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerNode {
    pub path: NodePath,
    pub children: Vec<TemplateNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentNode {
    pub path: NodePath,
    pub name: String,
    pub bindings: BTreeMap<String, Association>,
    pub children: Vec<TemplateNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
    pub path: NodePath,
}

pub const DEFAULT_ITEM_NAME: &str = "item";

/// Parse template JSON text into a validated node tree
pub fn parse_template(source: &str) -> BuildResult<TemplateNode> {
    let value: Value = serde_json::from_str(source)?;
    TemplateNode::from_json(&value, &NodePath::root())
}

impl TemplateNode {
    pub fn from_json(value: &Value, path: &NodePath) -> BuildResult<Self> {
        let object = as_object(value, path)?;

        let kind = match object.get("type") {
            Some(Value::String(kind)) => kind.as_str(),
            Some(other) => {
                return Err(BuildError::invalid_field(
                    "type",
                    format!("expected a string, found {}", other),
                    path,
                ))
            }
            None => return Err(BuildError::MissingKind { path: path.clone() }),
        };

        match kind {
            "string" => parse_string(object, path).map(TemplateNode::String),
            "input" => parse_input(object, path).map(TemplateNode::Input),
            "condition" | "if" => parse_condition(object, path).map(TemplateNode::Condition),
            "loop" | "foreach" => parse_loop(object, path).map(TemplateNode::Loop),
            "container" => parse_container(object, path).map(TemplateNode::Container),
            "component" => parse_component(object, path).map(TemplateNode::Component),
            "content" | "component-content" => Ok(TemplateNode::Content(ContentNode {
                path: path.clone(),
            })),
            unknown => Err(BuildError::UnknownKind {
                kind: unknown.to_string(),
                path: path.clone(),
            }),
        }
    }

    pub fn empty(path: NodePath) -> Self {
        TemplateNode::Container(ContainerNode {
            path,
            children: Vec::new(),
        })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TemplateNode::String(_) => "string",
            TemplateNode::Input(_) => "input",
            TemplateNode::Condition(_) => "condition",
            TemplateNode::Loop(_) => "loop",
            TemplateNode::Container(_) => "container",
            TemplateNode::Component(_) => "component",
            TemplateNode::Content(_) => "content",
        }
    }

    pub fn path(&self) -> &NodePath {
        match self {
            TemplateNode::String(node) => &node.path,
            TemplateNode::Input(node) => &node.path,
            TemplateNode::Condition(node) => &node.path,
            TemplateNode::Loop(node) => &node.path,
            TemplateNode::Container(node) => &node.path,
            TemplateNode::Component(node) => &node.path,
            TemplateNode::Content(node) => &node.path,
        }
    }
}

fn as_object<'v>(value: &'v Value, path: &NodePath) -> BuildResult<&'v Map<String, Value>> {
    value.as_object().ok_or_else(|| BuildError::NotAnObject {
        path: path.clone(),
        found: value.to_string(),
    })
}

/// First present field among `names`
fn field<'v>(object: &'v Map<String, Value>, names: &[&str]) -> Option<(&'v Value, String)> {
    names
        .iter()
        .find_map(|name| object.get(*name).map(|value| (value, name.to_string())))
}

fn parse_string(object: &Map<String, Value>, path: &NodePath) -> BuildResult<StringNode> {
    let value = object
        .get("value")
        .ok_or_else(|| BuildError::missing_field("string", "value", path))?;

    Ok(StringNode {
        path: path.clone(),
        value: Association::from_json(value, &path.child("value"))?,
        escape_html: constant_bool(object, "escapeHTML", path)?.unwrap_or(true),
        key: constant_string(object, &["key"], path)?,
    })
}

fn parse_input(object: &Map<String, Value>, path: &NodePath) -> BuildResult<InputNode> {
    let attributes = object
        .get("attributes")
        .ok_or_else(|| BuildError::missing_field("input", "attributes", path))?;

    Ok(InputNode {
        path: path.clone(),
        attributes: association_map(attributes, "attributes", path)?,
    })
}

fn parse_condition(object: &Map<String, Value>, path: &NodePath) -> BuildResult<ConditionNode> {
    let condition = object
        .get("condition")
        .map(|value| Association::from_json(value, &path.child("condition")))
        .transpose()?;
    let value = object
        .get("value")
        .map(|value| Association::from_json(value, &path.child("value")))
        .transpose()?;

    if condition.is_none() && value.is_none() {
        return Err(BuildError::missing_field("condition", "condition", path));
    }

    Ok(ConditionNode {
        path: path.clone(),
        condition,
        value,
        then_branch: branch(object, &["then"], path)?.map(Box::new),
        else_branch: branch(object, &["else"], path)?.map(Box::new),
        negate: constant_bool(object, "negate", path)?.unwrap_or(false),
        name: constant_string(object, &["name"], path)?,
    })
}

fn parse_loop(object: &Map<String, Value>, path: &NodePath) -> BuildResult<LoopNode> {
    let source = match (object.get("list"), object.get("count")) {
        (Some(_), Some(_)) => {
            return Err(BuildError::invalid_field(
                "count",
                "a loop takes either 'list' or 'count', not both",
                path,
            ))
        }
        (Some(list), None) => LoopSource::List(Association::from_json(list, &path.child("list"))?),
        (None, Some(count)) => {
            LoopSource::Count(Association::from_json(count, &path.child("count"))?)
        }
        (None, None) => return Err(BuildError::missing_field("loop", "list", path)),
    };

    let body = branch(object, &["body", "contents"], path)?
        .unwrap_or_else(|| TemplateNode::empty(path.child("body")));

    let start_index = match object.get("startIndex") {
        None => 0,
        Some(value) => value.as_i64().ok_or_else(|| {
            BuildError::invalid_field("startIndex", "expected an integer", path)
        })?,
    };

    Ok(LoopNode {
        path: path.clone(),
        source,
        body: Box::new(body),
        item: binding_name(object, "item", path)?
            .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string()),
        index: binding_name(object, "index", path)?,
        start_index,
        key: constant_string(object, &["key", "identifier"], path)?,
        separator: object
            .get("separator")
            .map(|value| Association::from_json(value, &path.child("separator")))
            .transpose()?,
    })
}

fn parse_container(object: &Map<String, Value>, path: &NodePath) -> BuildResult<ContainerNode> {
    Ok(ContainerNode {
        path: path.clone(),
        children: children(object, path)?,
    })
}

fn parse_component(object: &Map<String, Value>, path: &NodePath) -> BuildResult<ComponentNode> {
    let name = constant_string(object, &["name", "className", "class-name"], path)?
        .ok_or_else(|| BuildError::missing_field("component", "name", path))?;

    let bindings = match field(object, &["bindings", "parameters"]) {
        Some((value, field_name)) => association_map(value, &field_name, path)?,
        None => BTreeMap::new(),
    };

    Ok(ComponentNode {
        path: path.clone(),
        name,
        bindings,
        children: children(object, path)?,
    })
}

fn children(object: &Map<String, Value>, path: &NodePath) -> BuildResult<Vec<TemplateNode>> {
    match object.get("children") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => {
            let base = path.child("children");
            items
                .iter()
                .enumerate()
                .map(|(i, item)| TemplateNode::from_json(item, &base.child(i)))
                .collect()
        }
        Some(other) => Err(BuildError::invalid_field(
            "children",
            format!("expected an array, found {}", other),
            path,
        )),
    }
}

/// Nested content: a node, an array of nodes, or empty (`null` / `{}` / `[]`)
fn branch(
    object: &Map<String, Value>,
    names: &[&str],
    path: &NodePath,
) -> BuildResult<Option<TemplateNode>> {
    let (value, field_name) = match field(object, names) {
        Some(found) => found,
        None => return Ok(None),
    };
    let branch_path = path.child(field_name);

    match value {
        Value::Null => Ok(Some(TemplateNode::empty(branch_path))),
        Value::Object(map) if map.is_empty() => Ok(Some(TemplateNode::empty(branch_path))),
        Value::Array(items) => {
            let children = items
                .iter()
                .enumerate()
                .map(|(i, item)| TemplateNode::from_json(item, &branch_path.child(i)))
                .collect::<BuildResult<Vec<_>>>()?;
            Ok(Some(TemplateNode::Container(ContainerNode {
                path: branch_path,
                children,
            })))
        }
        other => TemplateNode::from_json(other, &branch_path).map(Some),
    }
}

fn association_map(
    value: &Value,
    field_name: &str,
    path: &NodePath,
) -> BuildResult<BTreeMap<String, Association>> {
    let object = value.as_object().ok_or_else(|| {
        BuildError::invalid_field(field_name, format!("expected an object, found {}", value), path)
    })?;

    let base = path.child(field_name);
    object
        .iter()
        .map(|(key, value)| -> BuildResult<(String, Association)> {
            Ok((key.clone(), Association::from_json(value, &base.child(key))?))
        })
        .collect()
}

/// A field that must be a constant string (short form or `{"type": "const"}`)
fn constant_string(
    object: &Map<String, Value>,
    names: &[&str],
    path: &NodePath,
) -> BuildResult<Option<String>> {
    let (value, field_name) = match field(object, names) {
        Some(found) => found,
        None => return Ok(None),
    };

    match Association::from_json(value, &path.child(&field_name))? {
        Association::Constant(Value::String(s)) if !s.is_empty() => Ok(Some(s)),
        other => Err(BuildError::invalid_field(
            field_name,
            format!("expected a non-empty constant string, found {}", other),
            path,
        )),
    }
}

fn constant_bool(
    object: &Map<String, Value>,
    name: &str,
    path: &NodePath,
) -> BuildResult<Option<bool>> {
    let value = match object.get(name) {
        Some(value) => value,
        None => return Ok(None),
    };

    match Association::from_json(value, &path.child(name))? {
        Association::Constant(Value::Bool(b)) => Ok(Some(b)),
        // Legacy templates spell booleans as "YES"/"NO"
        Association::Constant(Value::String(s)) if s.eq_ignore_ascii_case("yes") || s == "true" => {
            Ok(Some(true))
        }
        Association::Constant(Value::String(s)) if s.eq_ignore_ascii_case("no") || s == "false" => {
            Ok(Some(false))
        }
        other => Err(BuildError::invalid_field(
            name,
            format!("expected a constant boolean, found {}", other),
            path,
        )),
    }
}

/// Name of a variable a loop assigns (`"item"`, `"$item"` or `{"type": "var", "value": "item"}`)
fn binding_name(
    object: &Map<String, Value>,
    name: &str,
    path: &NodePath,
) -> BuildResult<Option<String>> {
    let value = match object.get(name) {
        Some(value) => value,
        None => return Ok(None),
    };

    let variable = match Association::from_json(value, &path.child(name))? {
        Association::KeyPath(key_path) if key_path.segments().len() == 1 => {
            key_path.as_str().to_string()
        }
        Association::Constant(Value::String(s)) if !s.is_empty() && !s.contains('.') => s,
        other => {
            return Err(BuildError::invalid_field(
                name,
                format!("expected a plain variable name, found {}", other),
                path,
            ))
        }
    };

    trace!(field = name, variable = %variable, "Loop variable");
    Ok(Some(variable))
}
