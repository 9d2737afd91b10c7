use crate::element::Element;
use crate::error::{RenderError, RenderResult};
use crate::registry::ComponentRegistry;
use crate::template::CompiledTemplate;
use crate::value::ValueExt;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Upper bound on iterations of a `count` loop unless configured otherwise
pub const DEFAULT_MAX_LOOP_COUNT: u64 = 100_000;

/// Render-time configuration shared by every scope of a render pass
#[derive(Clone)]
pub struct RenderEnv {
    labels: HashMap<String, String>,
    registry: Option<Arc<dyn ComponentRegistry>>,
    strict_labels: bool,
    max_loop_count: u64,
}

impl Default for RenderEnv {
    fn default() -> Self {
        Self {
            labels: HashMap::new(),
            registry: None,
            strict_labels: false,
            max_loop_count: DEFAULT_MAX_LOOP_COUNT,
        }
    }
}

impl RenderEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(mut self, labels: HashMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.labels.insert(key.into(), text.into());
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn ComponentRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Fail on unknown label keys instead of rendering the key itself
    pub fn with_strict_labels(mut self, strict: bool) -> Self {
        self.strict_labels = strict;
        self
    }

    /// Largest `count` a loop may render; larger counts fail the render
    pub fn with_max_loop_count(mut self, limit: u64) -> Self {
        self.max_loop_count = limit;
        self
    }

    pub fn max_loop_count(&self) -> u64 {
        self.max_loop_count
    }

    pub fn label(&self, key: &str) -> RenderResult<String> {
        match self.labels.get(key) {
            Some(text) => Ok(text.clone()),
            None if self.strict_labels => Err(RenderError::LabelNotFound {
                key: key.to_string(),
            }),
            None => {
                warn!(label = key, "Label not found, rendering key");
                Ok(key.to_string())
            }
        }
    }

    pub fn component(&self, name: &str) -> RenderResult<Arc<CompiledTemplate>> {
        self.registry
            .as_ref()
            .and_then(|registry| registry.resolve(name))
            .ok_or_else(|| RenderError::ComponentNotFound {
                name: name.to_string(),
            })
    }
}

/// Component instance being rendered, with the content projected into it
struct ComponentFrame<'a> {
    name: &'a str,
    content: &'a Element,
    caller: &'a RenderContext<'a>,
}

/// Variable scope for one render pass.
///
/// Loop iterations open child scopes that see their parent's variables.
/// Component instances open isolated scopes that only see their own bindings.
pub struct RenderContext<'a> {
    env: &'a RenderEnv,
    scope: Map<String, Value>,
    parent: Option<&'a RenderContext<'a>>,
    component: Option<ComponentFrame<'a>>,
}

impl<'a> RenderContext<'a> {
    pub fn new(env: &'a RenderEnv, values: Map<String, Value>) -> Self {
        Self {
            env,
            scope: values,
            parent: None,
            component: None,
        }
    }

    /// Root context from a JSON object; `null` is an empty context
    pub fn from_value(env: &'a RenderEnv, values: Value) -> RenderResult<Self> {
        match values {
            Value::Object(map) => Ok(Self::new(env, map)),
            Value::Null => Ok(Self::new(env, Map::new())),
            other => Err(RenderError::type_mismatch("<context>", "object", other.type_name())),
        }
    }

    pub fn env(&self) -> &'a RenderEnv {
        self.env
    }

    pub fn lookup(&self, key: &str) -> Option<&Value> {
        match self.scope.get(key) {
            Some(value) => Some(value),
            None => self.parent.and_then(|parent| parent.lookup(key)),
        }
    }

    /// Child scope used for one loop iteration
    pub fn child_scope(&self, values: Map<String, Value>) -> RenderContext<'_> {
        RenderContext {
            env: self.env,
            scope: values,
            parent: Some(self),
            component: None,
        }
    }

    /// Isolated scope for a component instance; `content` renders back in `self`
    pub(crate) fn component_scope<'b>(
        &'b self,
        name: &'b str,
        bindings: Map<String, Value>,
        content: &'b Element,
    ) -> RenderContext<'b> {
        RenderContext {
            env: self.env,
            scope: bindings,
            parent: None,
            component: Some(ComponentFrame {
                name,
                content,
                caller: self,
            }),
        }
    }

    fn component_frame(&self) -> Option<&ComponentFrame<'a>> {
        match &self.component {
            Some(frame) => Some(frame),
            None => self.parent.and_then(|parent| parent.component_frame()),
        }
    }

    /// Content projected into the innermost component, with the scope it renders in
    pub(crate) fn projected_content(&self) -> Option<(&'a Element, &'a RenderContext<'a>)> {
        self.component_frame().map(|frame| (frame.content, frame.caller))
    }

    /// Names of the component instances enclosing this scope, outermost first
    pub fn component_stack(&self) -> Vec<String> {
        let mut stack = Vec::new();
        let mut current = self.component_frame();
        while let Some(frame) = current {
            stack.push(frame.name.to_string());
            current = frame.caller.component_frame();
        }
        stack.reverse();
        stack
    }
}
