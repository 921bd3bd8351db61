use super::{ConfigValidator, GwlConfig};
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Looked up in the working directory when no explicit path is given
pub const CONFIG_FILE_NAME: &str = "fluent-gwl.toml";

pub struct ConfigLoader {
    working_dir: PathBuf,
    explicit: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            explicit: None,
        }
    }

    /// Use this file instead of `fluent-gwl.toml`; it must exist
    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    /// Read the file (if any), apply environment overrides and validate
    pub fn load(&self) -> Result<GwlConfig> {
        let mut config = match self.config_path() {
            Some(path) => Self::load_file(&path)?,
            None => {
                debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                GwlConfig::default()
            }
        };

        config.merge_env_vars();
        if let Some(catalog) = &config.catalog {
            if catalog.is_relative() {
                config.catalog = Some(self.working_dir.join(catalog));
            }
        }

        ConfigValidator::validate_config(&config)?;
        Ok(config)
    }

    fn config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit {
            return Some(path.clone());
        }
        let path = self.working_dir.join(CONFIG_FILE_NAME);
        path.exists().then_some(path)
    }

    fn load_file(path: &Path) -> Result<GwlConfig> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        GwlConfig::from_toml_str(&content)
    }
}
