use jsonui_response::ResponseError;
use std::fmt;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;
pub type RenderResult<T> = Result<T, RenderError>;

/// Location of a node inside a template tree, e.g. `/children/1/then`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, segment: impl ToString) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// Errors raised while compiling a template. Compilation never returns a partial tree.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Template is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a template node object at {path}, found {found}")]
    NotAnObject { path: NodePath, found: String },

    #[error("Node at {path} has no 'type' field")]
    MissingKind { path: NodePath },

    #[error("Unknown node type '{kind}' at {path}")]
    UnknownKind { kind: String, path: NodePath },

    #[error("Node '{kind}' at {path} is missing required field '{field}'")]
    MissingField {
        kind: &'static str,
        field: &'static str,
        path: NodePath,
    },

    #[error("Invalid field '{field}' at {path}: {message}")]
    InvalidField {
        field: String,
        message: String,
        path: NodePath,
    },

    #[error("Malformed binding '{expression}' at {path}: {reason}")]
    MalformedBinding {
        expression: String,
        reason: String,
        path: NodePath,
    },

    #[error("Cyclic component reference: {}", cycle.join(" → "))]
    CyclicComponent { cycle: Vec<String> },
}

impl BuildError {
    pub fn missing_field(kind: &'static str, field: &'static str, path: &NodePath) -> Self {
        Self::MissingField {
            kind,
            field,
            path: path.clone(),
        }
    }

    pub fn invalid_field(
        field: impl Into<String>,
        message: impl Into<String>,
        path: &NodePath,
    ) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
            path: path.clone(),
        }
    }

    pub fn malformed_binding(
        expression: impl Into<String>,
        reason: impl Into<String>,
        path: &NodePath,
    ) -> Self {
        Self::MalformedBinding {
            expression: expression.into(),
            reason: reason.into(),
            path: path.clone(),
        }
    }

    /// Path of the offending node, when the error is tied to one
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            BuildError::NotAnObject { path, .. }
            | BuildError::MissingKind { path }
            | BuildError::UnknownKind { path, .. }
            | BuildError::MissingField { path, .. }
            | BuildError::InvalidField { path, .. }
            | BuildError::MalformedBinding { path, .. } => Some(path),
            BuildError::Json(_) | BuildError::CyclicComponent { .. } => None,
        }
    }
}

/// Errors raised while rendering. A failed render produces no document.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Binding '{binding}' could not be resolved: no key '{key}'")]
    BindingNotFound { binding: String, key: String },

    #[error("Binding '{binding}': expected {expected}, found {found}")]
    TypeMismatch {
        binding: String,
        expected: &'static str,
        found: String,
    },

    #[error("Label '{key}' not found")]
    LabelNotFound { key: String },

    #[error("Component '{name}' not found")]
    ComponentNotFound { name: String },

    #[error("Loop '{binding}' asks for {count} iterations, the limit is {limit}")]
    LoopLimitExceeded { binding: String, count: u64, limit: u64 },

    #[error("Loop index '{index}' overflows: start {start_index} + position {position}")]
    IndexOverflow {
        index: String,
        start_index: i64,
        position: u64,
    },

    #[error("Recursive component detected: {component}\nCall stack: {}", call_stack.join(" → "))]
    RecursiveComponent {
        component: String,
        call_stack: Vec<String>,
    },

    #[error(transparent)]
    Response(#[from] ResponseError),
}

impl RenderError {
    pub fn type_mismatch(
        binding: impl Into<String>,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            binding: binding.into(),
            expected,
            found: found.into(),
        }
    }
}
