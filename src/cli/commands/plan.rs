//! `fluent-gwl plan`

use crate::cli::session::Session;
use crate::plan::RunPlan;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::info;

/// Execute a run plan; nothing is written unless the whole plan succeeds
pub fn run_plan_command(session: &Session, plan: &Path, prefix: Option<PathBuf>) -> Result<()> {
    let run_plan = RunPlan::from_path(plan)
        .with_context(|| format!("Failed to read run plan {}", plan.display()))?;
    let output = session
        .plan_executor()?
        .execute(&run_plan)
        .with_context(|| format!("Run plan {} failed", plan.display()))?;

    let prefix = prefix.unwrap_or_else(|| plan.with_extension(""));
    let (gwl_path, labware_path) = output_paths(&prefix);
    let worklist = output.worklist.render();
    let labware = output.inventory.to_tsv()?;

    if let Some(parent) = gwl_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&gwl_path, worklist)
        .with_context(|| format!("Failed to write {}", gwl_path.display()))?;
    std::fs::write(&labware_path, labware)
        .with_context(|| format!("Failed to write {}", labware_path.display()))?;

    info!(
        "Plan produced {} commands and {} labware entries",
        output.worklist.len(),
        output.inventory.len()
    );
    println!("Worklist: {}", gwl_path.display());
    println!("Labware:  {}", labware_path.display());
    Ok(())
}

/// `PREFIX.gwl` and `PREFIX_labware.txt`
pub fn output_paths(prefix: &Path) -> (PathBuf, PathBuf) {
    let with_suffix = |suffix: &str| {
        let mut name = OsString::from(prefix.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    };
    (with_suffix(".gwl"), with_suffix("_labware.txt"))
}
