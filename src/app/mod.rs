//! Application module
//!
//! Process-level concerns of the `fluent-gwl` binary:
//! - Application settings derived from the command line
//! - Logging setup
//! - Fatal error reporting and exit codes

pub mod config;
pub mod error_handling;
pub mod logging;

pub use config::AppConfig;
pub use error_handling::{exit_code, handle_fatal_error};
pub use logging::{init_logging, LogHandle};
