use super::{find_template_files, load_templates, LoadError};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Template directory (overrides config)
    pub dir: Option<PathBuf>,
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let dir = match args.dir {
        Some(dir) => PathBuf::from(cwd).join(dir),
        None => config.get_template_dir(cwd),
    };

    if !dir.is_dir() {
        return Err(anyhow!("Template directory does not exist: {:?}", dir));
    }

    println!("{}", "🔍 Checking templates...".bright_blue().bold());
    let file_count = find_template_files(&dir).len();
    if file_count == 0 {
        println!("{}", "⚠️  No .json templates found".yellow());
        return Ok(());
    }

    let (registry, failures) = load_templates(&dir);
    for name in registry.names() {
        println!("  {} {}", "✓".green(), name);
    }
    for failure in &failures {
        let path = match failure {
            LoadError::Read { path, .. }
            | LoadError::InvalidName { path }
            | LoadError::Build { path, .. } => path,
        };
        let relative_path = path.strip_prefix(&dir).unwrap_or(path);
        eprintln!(
            "  {} {} - {}",
            "✗".red(),
            relative_path.display(),
            failure.to_string().red()
        );
    }

    if let Err(err) = registry.check_cycles() {
        eprintln!("  {} {}", "✗".red(), err.to_string().red());
        return Err(anyhow!("Component references form a cycle"));
    }

    println!();
    if failures.is_empty() {
        println!("{} Checked {} templates", "✅".green(), registry.len());
        Ok(())
    } else {
        Err(anyhow!(
            "{} of {} templates failed to compile",
            failures.len(),
            file_count
        ))
    }
}
