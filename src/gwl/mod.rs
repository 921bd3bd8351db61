//! Worklist commands, sequencing and the GWL text format

pub mod check;
pub mod codec;
pub mod command;
pub mod sequencer;

pub use check::{check_worklist, check_worklist_file};
pub use codec::{format_volume, parse_worklist};
pub use command::{
    Command, ReagentDistribution, Transfer, DEFAULT_LIQUID_CLASS, DEFAULT_MULTI_LIQUID_CLASS,
};
pub use sequencer::{RunLog, RunSequencer};
