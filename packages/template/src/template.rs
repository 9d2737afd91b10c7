use crate::builder::TemplateBuilder;
use crate::context::{RenderContext, RenderEnv};
use crate::element::{Element, Loop, Render};
use crate::error::{BuildResult, NodePath, RenderResult};
use crate::id_generator::ComponentId;
use crate::node::{parse_template, LoopSource, TemplateNode};
use jsonui_response::JsonResponse;
use serde_json::Value;
use std::fmt::Write;
use tracing::{debug, instrument};

/// A compiled, immutable template. Share it behind an `Arc` across render passes.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTemplate {
    name: String,
    root: Element,
    element_count: u32,
    references: Vec<String>,
}

impl CompiledTemplate {
    pub(crate) fn new(
        name: String,
        root: Element,
        element_count: u32,
        references: Vec<String>,
    ) -> Self {
        Self {
            name,
            root,
            element_count,
            references,
        }
    }

    /// Compile a parsed JSON template with the default builder
    pub fn compile(name: &str, template: &Value) -> BuildResult<Self> {
        let node = TemplateNode::from_json(template, &NodePath::root())?;
        TemplateBuilder::new().build_template(name, &node)
    }

    /// Compile template JSON text with the default builder
    pub fn compile_str(name: &str, source: &str) -> BuildResult<Self> {
        let node = parse_template(source)?;
        TemplateBuilder::new().build_template(name, &node)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    /// Names of the components this template instantiates
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// All element ids in document order
    pub fn component_ids(&self) -> Vec<ComponentId> {
        let mut ids = Vec::with_capacity(self.element_count as usize);
        self.root.walk(&mut |element| ids.push(element.id().clone()));
        ids
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        self.root.find(id)
    }

    /// Render into a fresh response
    #[instrument(skip(self, context), fields(template = %self.name))]
    pub fn render(&self, context: &RenderContext<'_>) -> RenderResult<JsonResponse> {
        let mut response = JsonResponse::new();
        self.root.render(context, &mut response)?;
        debug!(strings = response.strings().len(), "Render complete");
        Ok(response)
    }

    /// Render against a JSON context and serialize the resulting document
    pub fn render_document(&self, env: &RenderEnv, values: Value) -> RenderResult<Value> {
        let context = RenderContext::from_value(env, values)?;
        let response = self.render(&context)?;
        Ok(response.to_document()?)
    }

    /// Indented, human-readable element tree with ids
    pub fn outline(&self) -> String {
        let mut out = String::new();
        write_outline(&self.root, 0, &mut out);
        out
    }
}

fn write_outline(element: &Element, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let detail = match element {
        Element::Literal(e) => format!(" {}", e.value),
        Element::Input(e) => {
            let names: Vec<&str> = e.attributes.keys().map(String::as_str).collect();
            format!(" [{}]", names.join(", "))
        }
        Element::Conditional(e) => match (e.condition(), e.value()) {
            (Some(condition), Some(value)) => format!(" {} == {}", condition, value),
            (None, Some(value)) => format!(" null == {}", value),
            (Some(condition), None) => format!(" {}", condition),
            (None, None) => String::new(),
        },
        Element::Loop(e) => format!(" {} as {} → loops[{}]", describe_source(e), e.item, e.key),
        Element::Component(e) => format!(" {}", e.name),
        Element::Container(_) | Element::Content(_) => String::new(),
    };

    let _ = writeln!(out, "{}{} #{}{}", indent, element.kind_name(), element.id(), detail);
    for child in element.children() {
        write_outline(child, depth + 1, out);
    }
}

fn describe_source(element: &Loop) -> String {
    match &element.source {
        LoopSource::List(list) => list.to_string(),
        LoopSource::Count(count) => format!("0..{}", count),
    }
}
