use crate::config::schema::ModuleDefaults;
use crate::core::error::Result;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const DEFAULTS_CONFIG_FILE: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "UV_PIP_CONFIG";

pub struct DefaultsManager {
    config_path: Option<PathBuf>,
}

impl DefaultsManager {
    /// Resolution order: explicit path, `UV_PIP_CONFIG`, the per-user config dir.
    pub fn new(explicit: Option<PathBuf>) -> Self {
        let config_path = explicit
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(Self::default_config_path);

        Self { config_path }
    }

    pub fn at(path: &Path) -> Self {
        Self {
            config_path: Some(path.to_path_buf()),
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "ansible-uv-pip", "uv-pip")
            .map(|dirs| dirs.config_dir().join(DEFAULTS_CONFIG_FILE))
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub async fn load(&self) -> Result<ModuleDefaults> {
        let Some(path) = self.config_path.as_deref() else {
            return Ok(ModuleDefaults::default());
        };

        if !path.exists() {
            debug!(path = %path.display(), "no defaults file; using built-in defaults");
            return Ok(ModuleDefaults::default());
        }

        let content = fs::read_to_string(path).await?;
        let defaults: ModuleDefaults = toml::from_str(&content)?;
        debug!(path = %path.display(), "loaded defaults");
        Ok(defaults)
    }
}
