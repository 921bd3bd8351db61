//! Command routing and execution

use crate::app::AppConfig;
use crate::cli::args::Commands;
use crate::cli::commands::*;
use crate::cli::session::Session;
use crate::config::GwlConfig;
use anyhow::Result;

/// Execute a CLI command based on the parsed arguments
pub fn execute_command(command: Commands, config: GwlConfig, app: &AppConfig) -> Result<()> {
    let open_session = move || Session::open(config);
    let path = |p: std::path::PathBuf| app.working_dir.join(p);

    match command {
        Commands::Plan { plan, prefix } => {
            run_plan_command(&open_session()?, &path(plan), prefix.map(path))
        }
        Commands::Check { file } => run_check_command(&path(file)),
        Commands::Labware { file, output } => {
            run_labware_command(&open_session()?, &path(file), output.map(path))
        }
        Commands::Catalog { listing } => run_catalog_command(&open_session()?.catalog, listing),
        Commands::Tip { volume, container } => {
            run_tip_command(&open_session()?, volume, container.as_deref())
        }
    }
}
