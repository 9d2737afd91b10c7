use super::{load_template, load_templates};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use jsonui_response::JsonResponse;
use jsonui_template::{RenderContext, RenderEnv};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template file to render
    pub file: PathBuf,

    /// JSON file with the render context
    #[arg(short, long)]
    pub context: Option<PathBuf>,

    /// Fail on label keys missing from the label table
    #[arg(long)]
    pub strict_labels: bool,

    /// Pretty-print the document (overrides config)
    #[arg(long)]
    pub pretty: bool,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;

    // Components resolve against the template directory
    let (mut registry, failures) = load_templates(&config.get_template_dir(cwd));
    for failure in &failures {
        warn!(error = %failure, "Skipping template");
    }

    let path = PathBuf::from(cwd).join(&args.file);
    let name = load_template(&mut registry, &path)?;
    let template = registry
        .get(&name)
        .cloned()
        .ok_or_else(|| anyhow!("Template {} was not registered", name))?;

    let values = match &args.context {
        Some(context) => read_context(&PathBuf::from(cwd).join(context))?,
        None => Value::Null,
    };

    let env = RenderEnv::new()
        .with_labels(config.load_labels(cwd)?)
        .with_strict_labels(args.strict_labels)
        .with_registry(Arc::new(registry));

    let context = RenderContext::from_value(&env, values)?;
    let response = template.render(&context)?;
    println!("{}", encode(response, args.pretty || config.pretty)?);

    Ok(())
}

fn read_context(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read context {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid context JSON in {}", path.display()))
}

fn encode(response: JsonResponse, pretty: bool) -> Result<String> {
    if pretty {
        Ok(response.to_pretty_string()?)
    } else {
        Ok(String::from_utf8(response.response_data()?)?)
    }
}
