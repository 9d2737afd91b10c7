use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "jsonui.config.json";

/// jsonui configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory containing .json templates
    #[serde(default = "default_template_dir")]
    pub template_dir: String,

    /// JSON file mapping label keys to localized text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,

    /// Pretty-print rendered documents
    #[serde(default)]
    pub pretty: bool,
}

fn default_template_dir() -> String {
    "templates".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get absolute path to the template directory
    pub fn get_template_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.template_dir)
    }

    /// Label table named by the config; empty when none is configured
    pub fn load_labels(&self, cwd: &str) -> anyhow::Result<HashMap<String, String>> {
        match &self.labels {
            Some(path) => {
                let content = std::fs::read_to_string(PathBuf::from(cwd).join(path))?;
                Ok(serde_json::from_str(&content)?)
            }
            None => Ok(HashMap::new()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
            labels: None,
            pretty: false,
        }
    }
}
