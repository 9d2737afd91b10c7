pub mod check;
pub mod compile;
pub mod render;

pub use check::{check, CheckArgs};
pub use compile::{compile, CompileArgs};
pub use render::{render, RenderArgs};

use jsonui_template::{BuildError, TemplateRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Failure to load one template file from disk
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Template file name is not valid UTF-8: {path}")]
    InvalidName { path: PathBuf },

    #[error("{source}")]
    Build {
        path: PathBuf,
        #[source]
        source: BuildError,
    },
}

/// Components are referenced by file stem: `templates/cards/Card.json` is `Card`
pub fn template_name(path: &Path) -> Result<String, LoadError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| LoadError::InvalidName {
            path: path.to_path_buf(),
        })
}

pub fn find_template_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();
    files
}

/// Compile one template file into the registry
pub fn load_template(registry: &mut TemplateRegistry, path: &Path) -> Result<String, LoadError> {
    let name = template_name(path)?;
    let source = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    registry
        .compile_str(&name, &source)
        .map_err(|source| LoadError::Build {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(template = %name, path = %path.display(), "Loaded template");
    Ok(name)
}

/// Compile every template under `dir`, collecting per-file failures
pub fn load_templates(dir: &Path) -> (TemplateRegistry, Vec<LoadError>) {
    let mut registry = TemplateRegistry::new();
    let mut failures = Vec::new();

    if dir.is_dir() {
        for path in find_template_files(dir) {
            if let Err(err) = load_template(&mut registry, &path) {
                failures.push(err);
            }
        }
    }

    (registry, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_templates_from_nested_dirs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("cards")).unwrap();
        fs::write(
            dir.path().join("Page.json"),
            r#"{"type": "component", "name": "Card"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("cards/Card.json"),
            r#"{"type": "string", "value": "card"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (registry, failures) = load_templates(dir.path());
        assert!(failures.is_empty());
        assert_eq!(registry.names(), vec!["Card", "Page"]);
    }

    #[test]
    fn test_load_failures_are_collected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Good.json"), r#"{"type": "container"}"#).unwrap();
        fs::write(dir.path().join("Bad.json"), r#"{"type": "bogus"}"#).unwrap();

        let (registry, failures) = load_templates(dir.path());
        assert_eq!(registry.names(), vec!["Good"]);
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            &failures[0],
            LoadError::Build { source: BuildError::UnknownKind { .. }, .. }
        ));
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let (registry, failures) = load_templates(&dir.path().join("nope"));
        assert!(registry.is_empty());
        assert!(failures.is_empty());
    }
}
