use super::template_name;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use jsonui_template::{parse_template, BuildOptions, TemplateBuilder};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Template file to compile
    pub file: PathBuf,

    /// Id seed (defaults to a hash of the template name)
    #[arg(long)]
    pub seed: Option<String>,

    /// Accept inputs without a `type` attribute
    #[arg(long)]
    pub lenient_inputs: bool,
}

pub fn compile(args: CompileArgs, cwd: &str) -> Result<()> {
    let path = PathBuf::from(cwd).join(&args.file);
    let name = template_name(&path)?;
    let source = fs::read_to_string(&path)
        .map_err(|e| anyhow!("Cannot read {}: {}", path.display(), e))?;

    let builder = TemplateBuilder::with_options(BuildOptions {
        strict_inputs: !args.lenient_inputs,
        id_seed: args.seed,
    });
    let node = parse_template(&source)?;
    let template = builder.build_template(&name, &node)?;

    println!("{} {}", "🔨 Compiled".bright_blue().bold(), name);
    print!("{}", template.outline());
    println!();
    println!("{} elements", template.element_count());
    if !template.references().is_empty() {
        println!("References: {}", template.references().join(", ").dimmed());
    }

    Ok(())
}
