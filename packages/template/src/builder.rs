//! # Template Builder
//!
//! Compiles a validated [`TemplateNode`] tree into an [`Element`] tree.
//!
//! ## Ids
//!
//! Every element receives a [`ComponentId`] from the [`IdGenerator`] threaded
//! through the recursion. Ids are issued in pre-order (a node before its
//! children, `then` before `else`), so compiling the same template twice gives
//! the same ids.
//!
//! ## Components
//!
//! Component references are recorded on the [`TemplateScope`] and resolved at
//! render time through the registry. Their children are compiled once, with the
//! referencing template.

use crate::conditional::Conditional;
use crate::element::{
    ComponentContent, ComponentReference, Container, Element, Input, Literal, Loop,
};
use crate::error::{BuildError, BuildResult};
use crate::id_generator::IdGenerator;
use crate::node::{
    ComponentNode, ConditionNode, ContainerNode, ContentNode, InputNode, LoopNode, StringNode,
    TemplateNode,
};
use crate::template::CompiledTemplate;
use tracing::{debug, info, instrument};

/// Options for template compilation
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Inputs must declare a `type` attribute and one of `name`/`value`
    pub strict_inputs: bool,
    /// Id seed; defaults to a hash of the template name
    pub id_seed: Option<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            strict_inputs: true,
            id_seed: None,
        }
    }
}

/// Per-template compilation state shared by all nodes of one template
#[derive(Debug, Clone)]
pub struct TemplateScope {
    name: String,
    references: Vec<String>,
}

impl TemplateScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            references: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_reference(&mut self, component: &str) {
        if !self.references.iter().any(|name| name == component) {
            self.references.push(component.to_string());
        }
    }

    /// Component names referenced by the template, in first-use order
    pub fn references(&self) -> &[String] {
        &self.references
    }

    pub fn into_references(self) -> Vec<String> {
        self.references
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateBuilder {
    options: BuildOptions,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Compile a whole template with a fresh id generator
    #[instrument(skip(self, root), fields(root_kind = root.kind_name()))]
    pub fn build_template(&self, name: &str, root: &TemplateNode) -> BuildResult<CompiledTemplate> {
        let mut ids = match &self.options.id_seed {
            Some(seed) => IdGenerator::from_seed(seed.clone()),
            None => IdGenerator::new(name),
        };
        let mut scope = TemplateScope::new(name);

        let element = self.build(root, &mut scope, &mut ids)?;

        info!(
            elements = ids.issued(),
            references = scope.references().len(),
            "Template compiled"
        );
        Ok(CompiledTemplate::new(
            name.to_string(),
            element,
            ids.issued(),
            scope.into_references(),
        ))
    }

    /// Dispatch on the node kind
    pub fn build(
        &self,
        node: &TemplateNode,
        template: &mut TemplateScope,
        ids: &mut IdGenerator,
    ) -> BuildResult<Element> {
        match node {
            TemplateNode::String(node) => self.build_from_string(node, template, ids),
            TemplateNode::Input(node) => self.build_from_input(node, template, ids),
            TemplateNode::Condition(node) => self.build_from_condition(node, template, ids),
            TemplateNode::Loop(node) => self.build_from_loop(node, template, ids),
            TemplateNode::Container(node) => self.build_from_container(node, template, ids),
            TemplateNode::Component(node) => self.build_from_component(node, template, ids),
            TemplateNode::Content(node) => self.build_from_content(node, template, ids),
        }
    }

    pub fn build_from_string(
        &self,
        node: &StringNode,
        _template: &mut TemplateScope,
        ids: &mut IdGenerator,
    ) -> BuildResult<Element> {
        Ok(Element::Literal(Literal {
            id: ids.next_id(),
            value: node.value.clone(),
            escape_html: node.escape_html,
            key: node.key.clone(),
        }))
    }

    pub fn build_from_input(
        &self,
        node: &InputNode,
        _template: &mut TemplateScope,
        ids: &mut IdGenerator,
    ) -> BuildResult<Element> {
        if self.options.strict_inputs {
            if !node.attributes.contains_key("type") {
                return Err(BuildError::missing_field("input", "attributes.type", &node.path));
            }
            if !node.attributes.contains_key("name") && !node.attributes.contains_key("value") {
                return Err(BuildError::missing_field("input", "attributes.name", &node.path));
            }
        }

        Ok(Element::Input(Input {
            id: ids.next_id(),
            attributes: node.attributes.clone(),
        }))
    }

    pub fn build_from_condition(
        &self,
        node: &ConditionNode,
        template: &mut TemplateScope,
        ids: &mut IdGenerator,
    ) -> BuildResult<Element> {
        let id = ids.next_id();

        let then_template = node
            .then_branch
            .as_deref()
            .map(|branch| self.build(branch, template, ids))
            .transpose()?;
        let else_template = node
            .else_branch
            .as_deref()
            .map(|branch| self.build(branch, template, ids))
            .transpose()?;

        let conditional = Conditional::new(
            id,
            node.condition.clone(),
            node.value.clone(),
            then_template,
            else_template,
        )
        .negated(node.negate)
        .named(node.name.clone());

        Ok(Element::Conditional(conditional))
    }

    pub fn build_from_loop(
        &self,
        node: &LoopNode,
        template: &mut TemplateScope,
        ids: &mut IdGenerator,
    ) -> BuildResult<Element> {
        let id = ids.next_id();
        let body = self.build(&node.body, template, ids)?;
        let key = node.key.clone().unwrap_or_else(|| id.to_string());

        Ok(Element::Loop(Loop {
            id,
            source: node.source.clone(),
            body: Box::new(body),
            item: node.item.clone(),
            index: node.index.clone(),
            start_index: node.start_index,
            key,
            separator: node.separator.clone(),
        }))
    }

    pub fn build_from_container(
        &self,
        node: &ContainerNode,
        template: &mut TemplateScope,
        ids: &mut IdGenerator,
    ) -> BuildResult<Element> {
        let id = ids.next_id();
        let children = self.build_children(&node.children, template, ids)?;
        Ok(Element::Container(Container::new(id, children)))
    }

    pub fn build_from_component(
        &self,
        node: &ComponentNode,
        template: &mut TemplateScope,
        ids: &mut IdGenerator,
    ) -> BuildResult<Element> {
        let id = ids.next_id();
        template.add_reference(&node.name);
        debug!(component = %node.name, template = template.name(), "Component reference");

        // Content gets its own id so projected children stay addressable
        let content_id = ids.next_id();
        let children = self.build_children(&node.children, template, ids)?;

        Ok(Element::Component(ComponentReference {
            id,
            name: node.name.clone(),
            bindings: node.bindings.clone(),
            content: Box::new(Element::Container(Container::new(content_id, children))),
        }))
    }

    pub fn build_from_content(
        &self,
        _node: &ContentNode,
        _template: &mut TemplateScope,
        ids: &mut IdGenerator,
    ) -> BuildResult<Element> {
        Ok(Element::Content(ComponentContent { id: ids.next_id() }))
    }

    fn build_children(
        &self,
        nodes: &[TemplateNode],
        template: &mut TemplateScope,
        ids: &mut IdGenerator,
    ) -> BuildResult<Vec<Element>> {
        nodes
            .iter()
            .map(|child| self.build(child, template, ids))
            .collect()
    }
}
