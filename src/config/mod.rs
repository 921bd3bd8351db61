//! Session configuration
//!
//! Settings are read from an optional `fluent-gwl.toml` and then overridden
//! by `FLUENT_GWL_*` environment variables:
//!
//! ```toml
//! catalog = "lab/catalog.yaml"
//! default_liquid_class = "Water Free Single"
//! tip_types = ["FCA, 200ul SBS", "FCA, 50ul SBS"]
//! strict_liquid_class = false
//! log_level = "info"
//! ```

pub mod loader;
pub mod validator;

pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use validator::ConfigValidator;

use crate::catalog::LabwareCatalog;
use crate::error::Result;
use crate::gwl::DEFAULT_LIQUID_CLASS;
use crate::tips::TipSelector;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_CATALOG: &str = "FLUENT_GWL_CATALOG";
pub const ENV_LIQUID_CLASS: &str = "FLUENT_GWL_LIQUID_CLASS";
pub const ENV_LOG_LEVEL: &str = "FLUENT_GWL_LOG_LEVEL";
pub const ENV_STRICT_LIQUID_CLASS: &str = "FLUENT_GWL_STRICT_LIQUID_CLASS";

/// Tip types enabled when the configuration names none
pub const DEFAULT_TIP_TYPES: [&str; 4] = [
    "FCA, 10ul SBS",
    "FCA, 50ul SBS",
    "FCA, 200ul SBS",
    "FCA, 1000ul SBS",
];

fn default_liquid_class() -> String {
    DEFAULT_LIQUID_CLASS.to_string()
}

fn default_tip_types() -> Vec<String> {
    DEFAULT_TIP_TYPES.iter().map(|t| t.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GwlConfig {
    /// Catalog document replacing the embedded one
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default = "default_liquid_class")]
    pub default_liquid_class: String,
    #[serde(default = "default_tip_types")]
    pub tip_types: Vec<String>,
    /// Fail on unknown liquid classes instead of substituting the default
    #[serde(default)]
    pub strict_liquid_class: bool,
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for GwlConfig {
    fn default() -> Self {
        Self {
            catalog: None,
            default_liquid_class: default_liquid_class(),
            tip_types: default_tip_types(),
            strict_liquid_class: false,
            log_level: None,
        }
    }
}

impl GwlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key/value source shaped like the environment
    pub fn merge_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(catalog) = lookup(ENV_CATALOG) {
            self.catalog = Some(PathBuf::from(catalog));
        }

        if let Some(liquid_class) = lookup(ENV_LIQUID_CLASS) {
            self.default_liquid_class = liquid_class;
        }

        if let Some(log_level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = Some(log_level);
        }

        if let Some(strict) = lookup(ENV_STRICT_LIQUID_CLASS) {
            if let Ok(value) = strict.parse::<bool>() {
                self.strict_liquid_class = value;
            }
        }
    }

    /// The configured catalog, or the embedded one
    pub fn load_catalog(&self) -> Result<LabwareCatalog> {
        match &self.catalog {
            Some(path) => LabwareCatalog::from_path(path),
            None => LabwareCatalog::builtin(),
        }
    }

    pub fn tip_selector<'a>(&self, catalog: &'a LabwareCatalog) -> Result<TipSelector<'a>> {
        TipSelector::with_tip_types(catalog, &self.tip_types)
    }
}
