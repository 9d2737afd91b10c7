//! Binding expressions ("associations") attached to template fields.
//!
//! A field value in a JSON template is one of:
//!
//! - a bare JSON literal: a constant (`"Hello"`, `42`, `{"a": 1}`)
//! - a `$`-prefixed string: a key path into the render context (`"$user.name"`);
//!   `"$$x"` is the constant string `"$x"`
//! - an explicit association object: `{"type": "const" | "var" | "label", "value": ...}`

use crate::context::RenderContext;
use crate::error::{BuildError, BuildResult, NodePath, RenderError, RenderResult};
use crate::value::ValueExt;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Association {
    Constant(Value),
    KeyPath(KeyPath),
    Label(String),
}

/// Dotted key path, e.g. `user.addresses.0.city`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    expression: String,
    segments: Vec<String>,
}

impl KeyPath {
    pub fn parse(expression: &str, path: &NodePath) -> BuildResult<Self> {
        if expression.is_empty() {
            return Err(BuildError::malformed_binding("$", "empty key path", path));
        }

        let mut segments = Vec::new();
        for segment in expression.split('.') {
            if segment.is_empty() {
                return Err(BuildError::malformed_binding(
                    format!("${}", expression),
                    "empty key path segment",
                    path,
                ));
            }
            if segment.chars().any(char::is_whitespace) {
                return Err(BuildError::malformed_binding(
                    format!("${}", expression),
                    format!("whitespace in segment '{}'", segment),
                    path,
                ));
            }
            segments.push(segment.to_string());
        }

        Ok(Self {
            expression: expression.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.expression
    }

    /// Resolve against the render context; a missing key is an error, never a default
    pub fn resolve(&self, context: &RenderContext<'_>) -> RenderResult<Value> {
        let (first, rest) = match self.segments.split_first() {
            Some(split) => split,
            None => {
                return Err(RenderError::BindingNotFound {
                    binding: self.expression.clone(),
                    key: String::new(),
                })
            }
        };

        let mut current = context.lookup(first).ok_or_else(|| RenderError::BindingNotFound {
            binding: self.expression.clone(),
            key: first.clone(),
        })?;

        for segment in rest {
            current = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                other => {
                    return Err(RenderError::type_mismatch(
                        self.expression.clone(),
                        "object or array",
                        other.type_name(),
                    ))
                }
            }
            .ok_or_else(|| RenderError::BindingNotFound {
                binding: self.expression.clone(),
                key: segment.clone(),
            })?;
        }

        Ok(current.clone())
    }
}

impl Association {
    pub fn constant(value: impl Into<Value>) -> Self {
        Association::Constant(value.into())
    }

    /// Parse a template field value into an association
    pub fn from_json(value: &Value, path: &NodePath) -> BuildResult<Self> {
        match value {
            Value::String(s) => {
                if let Some(escaped) = s.strip_prefix("$$") {
                    Ok(Association::Constant(Value::String(format!("${}", escaped))))
                } else if let Some(expression) = s.strip_prefix('$') {
                    Ok(Association::KeyPath(KeyPath::parse(expression, path)?))
                } else {
                    Ok(Association::Constant(value.clone()))
                }
            }
            Value::Object(map) if is_explicit_association(map) => {
                let inner = &map["value"];
                match map["type"].as_str() {
                    Some("const") => Ok(Association::Constant(inner.clone())),
                    Some("var") => match inner.as_str() {
                        Some(expression) => {
                            let expression = expression.strip_prefix('$').unwrap_or(expression);
                            Ok(Association::KeyPath(KeyPath::parse(expression, path)?))
                        }
                        None => Err(BuildError::malformed_binding(
                            inner.to_string(),
                            "'var' binding value must be a string",
                            path,
                        )),
                    },
                    _ => match inner.as_str() {
                        Some(key) if !key.is_empty() => Ok(Association::Label(key.to_string())),
                        _ => Err(BuildError::malformed_binding(
                            inner.to_string(),
                            "'label' binding value must be a non-empty string",
                            path,
                        )),
                    },
                }
            }
            other => Ok(Association::Constant(other.clone())),
        }
    }

    pub fn resolve(&self, context: &RenderContext<'_>) -> RenderResult<Value> {
        match self {
            Association::Constant(value) => Ok(value.clone()),
            Association::KeyPath(key_path) => key_path.resolve(context),
            Association::Label(key) => context.env().label(key).map(Value::String),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Association::Constant(_))
    }

    pub fn constant_value(&self) -> Option<&Value> {
        match self {
            Association::Constant(value) => Some(value),
            _ => None,
        }
    }
}

fn is_explicit_association(map: &serde_json::Map<String, Value>) -> bool {
    map.len() == 2
        && map.contains_key("value")
        && matches!(
            map.get("type").and_then(Value::as_str),
            Some("const" | "var" | "label")
        )
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Association::Constant(value) => write!(f, "{}", value),
            Association::KeyPath(key_path) => write!(f, "${}", key_path.as_str()),
            Association::Label(key) => write!(f, "label:{}", key),
        }
    }
}
