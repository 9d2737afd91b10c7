//! Compiled elements.
//!
//! Elements are immutable once built and are shared by every render pass of
//! their template. Each variant implements [`Render`]; [`Element`] dispatches.

use crate::binding::Association;
use crate::conditional::Conditional;
use crate::context::RenderContext;
use crate::error::{RenderError, RenderResult};
use crate::id_generator::ComponentId;
use crate::node::LoopSource;
use crate::value::{escape_html, ValueExt};
use jsonui_response::{InputDescriptor, JsonResponse};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Capability shared by all compiled elements
pub trait Render {
    fn render(&self, context: &RenderContext<'_>, response: &mut JsonResponse) -> RenderResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Literal(Literal),
    Input(Input),
    Conditional(Conditional),
    Loop(Loop),
    Container(Container),
    Component(ComponentReference),
    Content(ComponentContent),
}

impl Element {
    pub fn id(&self) -> &ComponentId {
        match self {
            Element::Literal(e) => &e.id,
            Element::Input(e) => &e.id,
            Element::Conditional(e) => e.id(),
            Element::Loop(e) => &e.id,
            Element::Container(e) => &e.id,
            Element::Component(e) => &e.id,
            Element::Content(e) => &e.id,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::Literal(_) => "string",
            Element::Input(_) => "input",
            Element::Conditional(_) => "condition",
            Element::Loop(_) => "loop",
            Element::Container(_) => "container",
            Element::Component(_) => "component",
            Element::Content(_) => "content",
        }
    }

    /// Direct children in document order
    pub fn children(&self) -> Vec<&Element> {
        match self {
            Element::Literal(_) | Element::Input(_) | Element::Content(_) => Vec::new(),
            Element::Conditional(e) => e.branches().collect(),
            Element::Loop(e) => vec![e.body.as_ref()],
            Element::Container(e) => e.children.iter().collect(),
            Element::Component(e) => vec![e.content.as_ref()],
        }
    }

    /// Pre-order walk; visits elements in the order their ids were issued
    pub fn walk<'e>(&'e self, visit: &mut impl FnMut(&'e Element)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        if self.id().as_str() == id {
            return Some(self);
        }
        self.children().into_iter().find_map(|child| child.find(id))
    }
}

impl Render for Element {
    fn render(&self, context: &RenderContext<'_>, response: &mut JsonResponse) -> RenderResult<()> {
        match self {
            Element::Literal(e) => e.render(context, response),
            Element::Input(e) => e.render(context, response),
            Element::Conditional(e) => e.render(context, response),
            Element::Loop(e) => e.render(context, response),
            Element::Container(e) => e.render(context, response),
            Element::Component(e) => e.render(context, response),
            Element::Content(e) => e.render(context, response),
        }
    }
}

/// Text written into `strings`
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub id: ComponentId,
    pub value: Association,
    pub escape_html: bool,
    pub key: Option<String>,
}

impl Render for Literal {
    fn render(&self, context: &RenderContext<'_>, response: &mut JsonResponse) -> RenderResult<()> {
        let value = self.value.resolve(context)?;
        let text = if self.escape_html {
            escape_html(&value.display_text())
        } else {
            value.display_text()
        };

        if let Association::Label(label_key) = &self.value {
            response.append_label(label_key.clone(), text.clone());
        }
        if let Some(key) = &self.key {
            response.append_value(key.clone(), value);
        }

        response.append_string(text);
        Ok(())
    }
}

/// Form field descriptor written into `inputs`
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub id: ComponentId,
    pub attributes: BTreeMap<String, Association>,
}

impl Render for Input {
    fn render(&self, context: &RenderContext<'_>, response: &mut JsonResponse) -> RenderResult<()> {
        let mut descriptor = InputDescriptor::new();
        for (name, association) in &self.attributes {
            descriptor.insert(name.clone(), association.resolve(context)?);
        }

        // The current field value is also published under the field name
        if let (Some(Value::String(name)), Some(value)) =
            (descriptor.get("name"), descriptor.get("value"))
        {
            response.append_value(name.clone(), value.clone());
        }

        response.append_input(descriptor);
        Ok(())
    }
}

/// Repeats its body once per source element, one sub-response per iteration
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    pub id: ComponentId,
    pub source: LoopSource,
    pub body: Box<Element>,
    pub item: String,
    pub index: Option<String>,
    pub start_index: i64,
    /// Key of the `loops` entry in the response
    pub key: String,
    /// Written as the first string of every iteration after the first
    pub separator: Option<Association>,
}

impl Loop {
    /// Number of iterations a `count` source asks for, bounded by the env limit
    fn count(&self, association: &Association, context: &RenderContext<'_>) -> RenderResult<u64> {
        let count = association.resolve(context)?;
        let n = count.as_u64().ok_or_else(|| {
            RenderError::type_mismatch(
                association.to_string(),
                "non-negative integer",
                count.type_name(),
            )
        })?;

        let limit = context.env().max_loop_count();
        if n > limit {
            return Err(RenderError::LoopLimitExceeded {
                binding: association.to_string(),
                count: n,
                limit,
            });
        }
        Ok(n)
    }

    fn render_iteration(
        &self,
        context: &RenderContext<'_>,
        position: u64,
        item: Value,
        separator: Option<&str>,
    ) -> RenderResult<JsonResponse> {
        let mut scope = Map::new();
        scope.insert(self.item.clone(), item);
        if let Some(index) = &self.index {
            let value = i64::try_from(position)
                .ok()
                .and_then(|position| self.start_index.checked_add(position))
                .ok_or_else(|| RenderError::IndexOverflow {
                    index: index.clone(),
                    start_index: self.start_index,
                    position,
                })?;
            scope.insert(index.clone(), Value::from(value));
        }

        let iteration_context = context.child_scope(scope);
        let mut sub_response = JsonResponse::new();
        if let Some(separator) = separator.filter(|_| position > 0) {
            sub_response.append_string(separator);
        }
        self.body.render(&iteration_context, &mut sub_response)?;
        Ok(sub_response)
    }
}

impl Render for Loop {
    fn render(&self, context: &RenderContext<'_>, response: &mut JsonResponse) -> RenderResult<()> {
        let separator = match &self.separator {
            Some(association) => Some(association.resolve(context)?.display_text()),
            None => None,
        };
        let separator = separator.as_deref();

        let mut iterations = Vec::new();
        match &self.source {
            LoopSource::List(association) => {
                let items = match association.resolve(context)? {
                    Value::Array(items) => items,
                    Value::Null => Vec::new(),
                    other => {
                        return Err(RenderError::type_mismatch(
                            association.to_string(),
                            "array",
                            other.type_name(),
                        ))
                    }
                };
                debug!(id = %self.id, key = %self.key, iterations = items.len(), "Rendering loop");
                iterations.reserve_exact(items.len());
                for (position, item) in (0u64..).zip(items) {
                    iterations.push(self.render_iteration(context, position, item, separator)?);
                }
            }
            LoopSource::Count(association) => {
                let count = self.count(association, context)?;
                debug!(id = %self.id, key = %self.key, iterations = count, "Rendering loop");
                for position in 0..count {
                    let item = Value::from(position);
                    iterations.push(self.render_iteration(context, position, item, separator)?);
                }
            }
        }

        response.append_loop(self.key.clone(), iterations);
        Ok(())
    }
}

/// Ordered children with no semantics of its own
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: ComponentId,
    pub children: Vec<Element>,
}

impl Container {
    pub fn new(id: ComponentId, children: Vec<Element>) -> Self {
        Self { id, children }
    }
}

impl Render for Container {
    fn render(&self, context: &RenderContext<'_>, response: &mut JsonResponse) -> RenderResult<()> {
        for child in &self.children {
            child.render(context, response)?;
        }
        Ok(())
    }
}

/// Instance of another compiled template, resolved through the component registry
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentReference {
    pub id: ComponentId,
    pub name: String,
    pub bindings: BTreeMap<String, Association>,
    /// Children projected into the component's `content` nodes, as a container
    pub content: Box<Element>,
}

impl Render for ComponentReference {
    fn render(&self, context: &RenderContext<'_>, response: &mut JsonResponse) -> RenderResult<()> {
        let mut call_stack = context.component_stack();
        if call_stack.contains(&self.name) {
            call_stack.push(self.name.clone());
            return Err(RenderError::RecursiveComponent {
                component: self.name.clone(),
                call_stack,
            });
        }

        let template = context.env().component(&self.name)?;

        // Bindings resolve in the caller's scope before entering the component
        let mut bindings = Map::new();
        for (name, association) in &self.bindings {
            bindings.insert(name.clone(), association.resolve(context)?);
        }

        trace!(
            id = %self.id,
            component = %self.name,
            depth = call_stack.len(),
            "Rendering component"
        );
        let component_context = context.component_scope(&self.name, bindings, &self.content);
        template.root().render(&component_context, response)
    }
}

/// Renders the content projected into the enclosing component instance
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentContent {
    pub id: ComponentId,
}

impl Render for ComponentContent {
    fn render(&self, context: &RenderContext<'_>, response: &mut JsonResponse) -> RenderResult<()> {
        match context.projected_content() {
            Some((content, caller)) => content.render(caller, response),
            None => {
                trace!(id = %self.id, "No component content to render");
                Ok(())
            }
        }
    }
}
