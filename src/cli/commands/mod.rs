//! Command implementation modules
//!
//! Each subcommand is implemented in its own module.

pub mod catalog;
pub mod check;
pub mod labware;
pub mod plan;
pub mod tip;

pub use catalog::run_catalog_command;
pub use check::run_check_command;
pub use labware::run_labware_command;
pub use plan::run_plan_command;
pub use tip::run_tip_command;
