//! # jsonui templates
//!
//! Compiles JSON-described page templates into element trees and renders them
//! into structured [`JsonResponse`] documents.
//!
//! ## Phases
//!
//! 1. **Compile** (once per template): JSON → [`TemplateNode`] → [`Element`] tree,
//!    every element tagged with a deterministic [`ComponentId`].
//! 2. **Render** (once per request): the immutable tree renders against a
//!    [`RenderContext`] into a fresh [`JsonResponse`], which is then serialized.
//!
//! Compilation errors are fatal to the template; render errors are fatal to the
//! render pass. Neither produces partial output.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jsonui_template::{CompiledTemplate, RenderEnv};
//! use serde_json::json;
//!
//! let template = CompiledTemplate::compile("Greeting", &json!({
//!     "type": "container",
//!     "children": [
//!         {"type": "string", "value": "Hello "},
//!         {"type": "string", "value": "$user.name"}
//!     ]
//! }))?;
//!
//! let doc = template.render_document(&RenderEnv::new(), json!({"user": {"name": "Ada"}}))?;
//! assert_eq!(doc["strings"], json!(["Hello ", "Ada"]));
//! ```

pub mod binding;
pub mod builder;
pub mod conditional;
pub mod context;
pub mod element;
pub mod error;
pub mod id_generator;
pub mod node;
pub mod registry;
pub mod template;
pub mod value;

pub use binding::{Association, KeyPath};
pub use builder::{BuildOptions, TemplateBuilder, TemplateScope};
pub use conditional::Conditional;
pub use context::{RenderContext, RenderEnv, DEFAULT_MAX_LOOP_COUNT};
pub use element::{
    ComponentContent, ComponentReference, Container, Element, Input, Literal, Loop, Render,
};
pub use error::{BuildError, BuildResult, NodePath, RenderError, RenderResult};
pub use id_generator::{get_template_seed, ComponentId, IdGenerator};
pub use jsonui_response::{InputDescriptor, JsonResponse, ResponseError};
pub use node::{parse_template, LoopSource, TemplateNode};
pub use registry::{ComponentRegistry, TemplateRegistry};
pub use template::CompiledTemplate;
pub use value::ValueExt;
