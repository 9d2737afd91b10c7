use crate::builder::TemplateBuilder;
use crate::error::{BuildError, BuildResult, NodePath};
use crate::node::{parse_template, TemplateNode};
use crate::template::CompiledTemplate;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error};

/// Resolves component names to compiled templates at render time
pub trait ComponentRegistry: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Arc<CompiledTemplate>>;
}

/// In-memory registry of compiled templates keyed by name
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    builder: TemplateBuilder,
    templates: HashMap<String, Arc<CompiledTemplate>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: TemplateBuilder) -> Self {
        Self {
            builder,
            templates: HashMap::new(),
        }
    }

    /// Compile and register a parsed JSON template
    pub fn compile(&mut self, name: &str, template: &Value) -> BuildResult<Arc<CompiledTemplate>> {
        let node = TemplateNode::from_json(template, &NodePath::root())?;
        let compiled = self.builder.build_template(name, &node)?;
        Ok(self.insert(compiled))
    }

    /// Compile and register template JSON text
    pub fn compile_str(&mut self, name: &str, source: &str) -> BuildResult<Arc<CompiledTemplate>> {
        let node = parse_template(source)?;
        let compiled = self.builder.build_template(name, &node)?;
        Ok(self.insert(compiled))
    }

    pub fn insert(&mut self, template: CompiledTemplate) -> Arc<CompiledTemplate> {
        let template = Arc::new(template);
        debug!(template = template.name(), "Registering template");
        self.templates
            .insert(template.name().to_string(), Arc::clone(&template));
        template
    }

    pub fn get(&self, name: &str) -> Option<&Arc<CompiledTemplate>> {
        self.templates.get(name)
    }

    /// Registered template names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Reject component reference cycles between registered templates.
    ///
    /// References to unregistered templates are skipped here; they fail at render time.
    pub fn check_cycles(&self) -> BuildResult<()> {
        let mut finished = HashSet::new();
        for name in self.names() {
            let mut stack = Vec::new();
            self.visit(name, &mut stack, &mut finished)?;
        }
        Ok(())
    }

    fn visit<'r>(
        &'r self,
        name: &'r str,
        stack: &mut Vec<&'r str>,
        finished: &mut HashSet<&'r str>,
    ) -> BuildResult<()> {
        if finished.contains(name) {
            return Ok(());
        }

        if let Some(start) = stack.iter().position(|entry| *entry == name) {
            let mut cycle: Vec<String> =
                stack[start..].iter().map(|entry| entry.to_string()).collect();
            cycle.push(name.to_string());
            error!(cycle = ?cycle, "Component cycle detected");
            return Err(BuildError::CyclicComponent { cycle });
        }

        let template = match self.templates.get(name) {
            Some(template) => template,
            None => return Ok(()),
        };

        stack.push(name);
        for reference in template.references() {
            self.visit(reference, stack, finished)?;
        }
        stack.pop();

        finished.insert(name);
        Ok(())
    }
}

impl ComponentRegistry for TemplateRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<CompiledTemplate>> {
        self.templates.get(name).cloned()
    }
}

impl ComponentRegistry for HashMap<String, Arc<CompiledTemplate>> {
    fn resolve(&self, name: &str) -> Option<Arc<CompiledTemplate>> {
        self.get(name).cloned()
    }
}
