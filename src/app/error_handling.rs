//! Error handling utilities

use crate::error::Error;
use tracing::error;

pub const GENERAL_ERROR: i32 = 1;
pub const ARGUMENT_ERROR: i32 = 2;

/// Exit status for an error: 2 for bad input, 1 for everything else
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<Error>() {
        Some(err) if err.is_usage_error() => ARGUMENT_ERROR,
        _ => GENERAL_ERROR,
    }
}

/// Report a fatal error and exit
///
/// With `verbose >= 1` the whole context chain is printed as well.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {:#}", error);

    eprintln!("Error: {error}");
    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    } else if let Some(cause) = error.chain().nth(1) {
        eprintln!("  caused by: {cause}");
    }

    std::process::exit(exit_code(&error))
}
