//! `fluent-gwl labware`

use crate::cli::session::Session;
use crate::gwl::{parse_worklist, Command};
use crate::worktable::WorktableAllocator;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Allocate the worktable for an existing worklist
pub fn run_labware_command(session: &Session, file: &Path, output: Option<PathBuf>) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let commands = parse_worklist(&text)
        .with_context(|| format!("{} is not a valid worklist", file.display()))?;
    let commands = resequence_if_needed(session, commands)?;

    let inventory = WorktableAllocator::new(&session.catalog)
        .allocate(&commands)
        .with_context(|| format!("Failed to place the labware of {}", file.display()))?;

    match output {
        Some(path) => {
            inventory
                .write_tsv(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Labware: {}", path.display());
        }
        None => print!("{}", inventory.to_tsv()?),
    }
    Ok(())
}

/// Tip counts need a tip type on every aspirate. Worklists written without
/// one are replayed through a sequencer, which also validates them.
fn resequence_if_needed(session: &Session, commands: Vec<Command>) -> Result<Vec<Command>> {
    if commands
        .iter()
        .all(|c| !c.is_aspirate() || c.tip_type().is_some())
    {
        return Ok(commands);
    }
    debug!("Worklist lacks tip types; replaying it to select tips");
    let mut sequencer = session.sequencer()?;
    sequencer.extend(commands, &session.config.default_liquid_class)?;
    Ok(sequencer.finish().into_commands())
}
