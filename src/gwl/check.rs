//! Worklist validity checker
//!
//! A worklist is valid when it has no empty lines and every line starts with
//! one of the command ids the robot accepts. Trailing whitespace is ignored.

use crate::error::{Error, Result};
use std::path::Path;
use tracing::debug;

/// First characters a worklist line may start with
pub const COMMAND_IDS: [char; 7] = ['A', 'D', 'R', 'W', 'F', 'C', 'B'];

/// Check worklist text, returning the number of lines checked
pub fn check_worklist(text: &str) -> Result<usize> {
    let mut count = 0;
    for (i, line) in text.lines().enumerate() {
        let line = line.trim_end();
        match line.chars().next() {
            None => {
                return Err(Error::InvalidWorklist {
                    line: i + 1,
                    reason: "empty line".to_string(),
                })
            }
            Some(c) if !COMMAND_IDS.contains(&c) => {
                return Err(Error::InvalidWorklist {
                    line: i + 1,
                    reason: format!("line starts with \"{c}\", not a command id"),
                })
            }
            Some(_) => count += 1,
        }
    }
    debug!("Worklist check passed for {} lines", count);
    Ok(count)
}

pub fn check_worklist_file(path: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(path)?;
    check_worklist(&text)
}
