//! Command-line interface
//!
//! Argument parsing, the per-invocation session and one handler per
//! subcommand.

pub mod args;
pub mod commands;
pub mod router;
pub mod session;

pub use args::{CatalogListing, Cli, Commands};
pub use router::execute_command;
pub use session::Session;
