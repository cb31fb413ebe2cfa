use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_LOCALE: &str = "C";

/// Host-level defaults read from `config.toml`. Module arguments always win.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ModuleDefaults {
    #[serde(default)]
    pub uv: UvConfig,
    #[serde(default)]
    pub python: PythonConfig,
    #[serde(default)]
    pub process: ProcessConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct UvConfig {
    /// Searched before `PATH` when locating the uv binary.
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PythonConfig {
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProcessConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
        }
    }
}

fn default_candidates() -> Vec<String> {
    vec!["python3".to_string(), "python".to_string()]
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}
