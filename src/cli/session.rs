//! Settings and catalog shared by every subcommand

use crate::catalog::LabwareCatalog;
use crate::config::{ConfigLoader, GwlConfig};
use crate::gwl::RunSequencer;
use crate::plan::PlanExecutor;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct Session {
    pub config: GwlConfig,
    pub catalog: LabwareCatalog,
}

impl Session {
    /// Load the configuration; `catalog` overrides the configured catalog path
    pub fn load_config(
        working_dir: &Path,
        config_file: Option<PathBuf>,
        catalog: Option<PathBuf>,
    ) -> Result<GwlConfig> {
        let mut config = ConfigLoader::new(working_dir)
            .with_config_file(config_file)
            .load()
            .context("Failed to load configuration")?;
        if catalog.is_some() {
            config.catalog = catalog;
        }
        Ok(config)
    }

    pub fn open(config: GwlConfig) -> Result<Self> {
        let catalog = config.load_catalog().with_context(|| match &config.catalog {
            Some(path) => format!("Failed to load catalog {}", path.display()),
            None => "Failed to load the built-in catalog".to_string(),
        })?;
        debug!(
            "Catalog ready: {} labware types, {} tip types",
            catalog.labware_types().count(),
            catalog.tip_types().len()
        );
        Ok(Self { config, catalog })
    }

    pub fn sequencer(&self) -> Result<RunSequencer<'_>> {
        let tips = self.config.tip_selector(&self.catalog)?;
        Ok(RunSequencer::with_tip_selector(&self.catalog, tips)
            .strict_liquid_class(self.config.strict_liquid_class))
    }

    pub fn plan_executor(&self) -> Result<PlanExecutor<'_>> {
        let tips = self.config.tip_selector(&self.catalog)?;
        Ok(PlanExecutor::new(&self.catalog)
            .with_tip_selector(tips)
            .with_default_liquid_class(self.config.default_liquid_class.clone())
            .strict_liquid_class(self.config.strict_liquid_class))
    }
}
