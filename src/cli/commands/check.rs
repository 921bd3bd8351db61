//! `fluent-gwl check`

use crate::gwl::check_worklist_file;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run_check_command(file: &Path) -> Result<()> {
    let count = check_worklist_file(file)
        .with_context(|| format!("{} is not a valid worklist", file.display()))?;
    println!("{}: {} commands, OK", file.display(), count);
    Ok(())
}
