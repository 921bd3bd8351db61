//! # fluent-gwl
//!
//! Turns tables of liquid transfers into Tecan Fluent worklists (`.gwl`) and
//! a worktable layout for the labware they use.
//!
//! ## Usage
//!
//! ```bash
//! fluent-gwl plan pcr_setup.yaml --prefix run1
//! fluent-gwl check run1.gwl
//! fluent-gwl tip 42 --container "1.5ml Eppendorf"
//! ```
//!
//! ## Modules
//!
//! - `app` - Process setup for the binary: logging and fatal error reporting
//! - `catalog` - Read-only registry of labware, tip types and liquid classes
//! - `cli` - Argument parsing and subcommand handlers
//! - `config` - Session configuration from `fluent-gwl.toml` and the environment
//! - `error` - Library error type
//! - `gwl` - Worklist commands, the run sequencer and the GWL text format
//! - `plan` - YAML run plans executed into a worklist and inventory
//! - `planner` - Batching strategies and the 384-well pipetting order
//! - `tips` - Tip type selection by volume
//! - `wells` - Well ids to column-wise positions and back
//! - `worktable` - Worktable layout, slot allocation and the labware inventory
pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod gwl;
pub mod plan;
pub mod planner;
pub mod tips;
pub mod wells;
pub mod worktable;

pub use error::{Error, Result};
