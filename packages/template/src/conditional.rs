//! Conditional element.
//!
//! Two evaluation modes:
//!
//! - **boolean**: only `condition` is bound; its resolved value's truthiness picks the branch
//! - **compare**: `value` is bound; the branch is picked by structural equality of the
//!   resolved `condition` (null when unbound) and the resolved `value`
//!
//! `negate` swaps the branches. Missing branches render nothing.

use crate::binding::Association;
use crate::context::RenderContext;
use crate::element::{Element, Render};
use crate::error::RenderResult;
use crate::id_generator::ComponentId;
use crate::value::ValueExt;
use jsonui_response::JsonResponse;
use serde_json::Value;
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    id: ComponentId,
    condition: Option<Association>,
    value: Option<Association>,
    then_template: Option<Box<Element>>,
    else_template: Option<Box<Element>>,
    negate: bool,
    /// Diagnostic name, only used in logs
    name: Option<String>,
}

impl Conditional {
    pub fn new(
        id: ComponentId,
        condition: Option<Association>,
        value: Option<Association>,
        then_template: Option<Element>,
        else_template: Option<Element>,
    ) -> Self {
        Self {
            id,
            condition,
            value,
            then_template: then_template.map(Box::new),
            else_template: else_template.map(Box::new),
            negate: false,
            name: None,
        }
    }

    pub fn negated(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    pub fn named(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    pub fn condition(&self) -> Option<&Association> {
        self.condition.as_ref()
    }

    pub fn value(&self) -> Option<&Association> {
        self.value.as_ref()
    }

    pub fn then_template(&self) -> Option<&Element> {
        self.then_template.as_deref()
    }

    pub fn else_template(&self) -> Option<&Element> {
        self.else_template.as_deref()
    }

    pub fn is_compare_mode(&self) -> bool {
        self.value.is_some()
    }

    /// Present branches, then before else
    pub fn branches(&self) -> impl Iterator<Item = &Element> {
        self.then_template().into_iter().chain(self.else_template())
    }

    /// Whether the then-branch is selected in `context`
    pub fn evaluate(&self, context: &RenderContext<'_>) -> RenderResult<bool> {
        let selected = match (&self.condition, &self.value) {
            (condition, Some(value)) => {
                let left = match condition {
                    Some(condition) => condition.resolve(context)?,
                    None => Value::Null,
                };
                let right = value.resolve(context)?;
                left.structurally_equals(&right)
            }
            (Some(condition), None) => condition.resolve(context)?.is_truthy(),
            (None, None) => false,
        };

        Ok(selected != self.negate)
    }
}

impl Render for Conditional {
    fn render(&self, context: &RenderContext<'_>, response: &mut JsonResponse) -> RenderResult<()> {
        let selected = self.evaluate(context)?;
        trace!(
            id = %self.id,
            name = self.name.as_deref().unwrap_or(""),
            selected,
            "Evaluated condition"
        );

        let branch = if selected {
            self.then_template()
        } else {
            self.else_template()
        };

        match branch {
            Some(element) => element.render(context, response),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RenderEnv;
    use crate::element::Literal;
    use crate::error::{NodePath, RenderError};
    use serde_json::json;

    fn text(id: &str, value: &str) -> Element {
        Element::Literal(Literal {
            id: ComponentId::from(id),
            value: Association::constant(value),
            escape_html: false,
            key: None,
        })
    }

    fn binding(expression: &str) -> Association {
        Association::from_json(&json!(expression), &NodePath::root()).unwrap()
    }

    fn render(conditional: &Conditional, values: Value) -> RenderResult<Vec<String>> {
        let env = RenderEnv::new();
        let context = RenderContext::from_value(&env, values)?;
        let mut response = JsonResponse::new();
        conditional.render(&context, &mut response)?;
        Ok(response.strings().to_vec())
    }

    #[test]
    fn test_boolean_mode_selects_branch() {
        let conditional = Conditional::new(
            "c-1".into(),
            Some(binding("$flag")),
            None,
            Some(text("c-2", "then")),
            Some(text("c-3", "else")),
        );

        assert_eq!(render(&conditional, json!({"flag": true})).unwrap(), ["then"]);
        assert_eq!(render(&conditional, json!({"flag": false})).unwrap(), ["else"]);
        assert_eq!(render(&conditional, json!({"flag": "yes"})).unwrap(), ["then"]);
        assert_eq!(render(&conditional, json!({"flag": []})).unwrap(), ["else"]);
        assert_eq!(render(&conditional, json!({"flag": null})).unwrap(), ["else"]);
    }

    #[test]
    fn test_missing_else_renders_nothing() {
        let conditional = Conditional::new(
            "c-1".into(),
            Some(binding("$flag")),
            None,
            Some(text("c-2", "then")),
            None,
        );
        assert!(render(&conditional, json!({"flag": 0})).unwrap().is_empty());
    }

    #[test]
    fn test_compare_mode_uses_structural_equality() {
        let conditional = Conditional::new(
            "c-1".into(),
            Some(binding("$selected")),
            Some(binding("$current")),
            Some(text("c-2", "match")),
            Some(text("c-3", "differ")),
        );

        let same = json!({
            "selected": {"id": 1, "tags": ["a"]},
            "current": {"id": 1.0, "tags": ["a"]}
        });
        let different = json!({"selected": {"id": 1}, "current": {"id": 2}});
        assert_eq!(render(&conditional, same).unwrap(), ["match"]);
        assert_eq!(render(&conditional, different).unwrap(), ["differ"]);

        // Compare mode does not use truthiness: false == false selects then
        let falsy = json!({"selected": false, "current": false});
        assert_eq!(render(&conditional, falsy).unwrap(), ["match"]);
    }

    #[test]
    fn test_value_only_compares_against_null() {
        let conditional = Conditional::new(
            "c-1".into(),
            None,
            Some(binding("$maybe")),
            Some(text("c-2", "unset")),
            Some(text("c-3", "set")),
        );

        assert_eq!(render(&conditional, json!({"maybe": null})).unwrap(), ["unset"]);
        assert_eq!(render(&conditional, json!({"maybe": 3})).unwrap(), ["set"]);
    }

    #[test]
    fn test_negate_swaps_branches() {
        let conditional = Conditional::new(
            "c-1".into(),
            Some(binding("$flag")),
            None,
            Some(text("c-2", "then")),
            Some(text("c-3", "else")),
        )
        .negated(true)
        .named(Some("hide-when-flag".to_string()));

        assert_eq!(render(&conditional, json!({"flag": true})).unwrap(), ["else"]);
    }

    #[test]
    fn test_resolution_failure_propagates() {
        let conditional = Conditional::new(
            "c-1".into(),
            Some(binding("$missing")),
            None,
            Some(text("c-2", "x")),
            None,
        );
        assert!(matches!(
            render(&conditional, json!({})),
            Err(RenderError::BindingNotFound { .. })
        ));
    }
}
