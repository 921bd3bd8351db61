//! CLI argument structures

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Turn run plans into Tecan Fluent worklists and worktable layouts
#[derive(Parser, Debug)]
#[command(name = "fluent-gwl")]
#[command(about = "fluent-gwl - Tecan Fluent worklist and worktable generator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ./fluent-gwl.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Labware catalog replacing the embedded one
    #[arg(long, value_name = "FILE", global = true)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a run plan and write its worklist and labware table
    #[command(name = "plan")]
    Plan {
        /// Run plan (YAML)
        plan: PathBuf,

        /// Output prefix; writes PREFIX.gwl and PREFIX_labware.txt
        #[arg(short, long, value_name = "PREFIX")]
        prefix: Option<PathBuf>,
    },

    /// Check that a worklist file is well formed
    #[command(name = "check")]
    Check {
        /// Worklist file (.gwl)
        file: PathBuf,
    },

    /// Allocate worktable positions for the labware a worklist uses
    #[command(name = "labware")]
    Labware {
        /// Worklist file (.gwl)
        file: PathBuf,

        /// Write the table here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List catalog contents
    #[command(name = "catalog")]
    Catalog {
        /// What to list (everything when omitted)
        #[arg(value_enum)]
        listing: Option<CatalogListing>,
    },

    /// Show the tip type chosen for a volume
    #[command(name = "tip")]
    Tip {
        /// Volume in microliters
        volume: f64,

        /// Labware type the liquid is aspirated from
        #[arg(short, long, value_name = "TYPE")]
        container: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogListing {
    Labware,
    Tips,
    LiquidClasses,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fluent-gwl",
            "plan",
            "run.yaml",
            "--prefix",
            "out/run1",
            "-vv",
            "--catalog",
            "lab.yaml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.catalog, Some(PathBuf::from("lab.yaml")));
        match cli.command {
            Commands::Plan { plan, prefix } => {
                assert_eq!(plan, PathBuf::from("run.yaml"));
                assert_eq!(prefix, Some(PathBuf::from("out/run1")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_catalog_listing_names() {
        let cli = Cli::try_parse_from(["fluent-gwl", "catalog", "liquid-classes"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Catalog {
                listing: Some(CatalogListing::LiquidClasses)
            }
        ));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["fluent-gwl"]).is_err());
    }
}
