//! Batch planning of per-well liquid transfers
//!
//! Planners turn rows whose volumes are already known into worklist
//! commands. The `plan_*` functions are pure and return the commands they
//! would emit; [`BatchPlanner`] runs them and appends the result to a
//! [`RunSequencer`], so every planned command is validated the same way as a
//! hand-written one.

pub mod distribution;
pub mod multi_dispense;
pub mod order;
pub mod tip_reuse;

pub use distribution::{excluded_positions, plan_distribution, DistributionOptions};
pub use multi_dispense::{plan_multi_dispense, MultiDispenseOptions, OVERAGE_FACTOR};
pub use order::{reorder, reorder_384, reorder_by_labware};
pub use tip_reuse::{channel_order, plan_tip_reuse, tip_batch, TipReuseOptions, CHANNELS};

use crate::error::Result;
use crate::gwl::{Command, RunSequencer};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One position on one container instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Well {
    pub rack_label: String,
    pub rack_type: String,
    pub position: u32,
}

impl Well {
    pub fn new(rack_label: impl Into<String>, rack_type: impl Into<String>, position: u32) -> Self {
        Self {
            rack_label: rack_label.into(),
            rack_type: rack_type.into(),
            position,
        }
    }
}

/// A source-to-destination transfer of a fixed volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRow {
    pub source: Well,
    pub dest: Well,
    pub volume: f64,
}

impl TransferRow {
    pub fn new(source: Well, dest: Well, volume: f64) -> Self {
        Self {
            source,
            dest,
            volume,
        }
    }
}

/// A destination that receives liquid from a shared source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispenseTarget {
    pub dest: Well,
    pub volume: f64,
}

impl DispenseTarget {
    pub fn new(dest: Well, volume: f64) -> Self {
        Self { dest, volume }
    }
}

/// Rows that name a destination well
pub trait Addressed {
    fn destination(&self) -> &Well;
}

impl Addressed for Well {
    fn destination(&self) -> &Well {
        self
    }
}

impl Addressed for TransferRow {
    fn destination(&self) -> &Well {
        &self.dest
    }
}

impl Addressed for DispenseTarget {
    fn destination(&self) -> &Well {
        &self.dest
    }
}

/// Volumes are handed to the robot with two decimals
#[must_use]
pub fn round_volume(volume: f64) -> f64 {
    (volume * 100.0).round() / 100.0
}

/// Runs the planners against a live sequencer
pub struct BatchPlanner<'s, 'a> {
    sequencer: &'s mut RunSequencer<'a>,
    default_liquid_class: String,
}

impl<'s, 'a> BatchPlanner<'s, 'a> {
    pub fn new(sequencer: &'s mut RunSequencer<'a>, default_liquid_class: impl Into<String>) -> Self {
        Self {
            sequencer,
            default_liquid_class: default_liquid_class.into(),
        }
    }

    /// Per-row aspirate/dispense pairs with tips reused in batches
    pub fn tip_reuse(&mut self, rows: &[TransferRow], options: &TipReuseOptions) -> Result<usize> {
        let commands = plan_tip_reuse(rows, options)?;
        self.append_all(commands, "tip-reuse")
    }

    /// One reagent distribution per destination container
    pub fn distribute(
        &mut self,
        targets: &[DispenseTarget],
        options: &DistributionOptions,
    ) -> Result<usize> {
        let commands = plan_distribution(self.sequencer.catalog(), targets, options)?;
        self.append_all(commands, "reagent distribution")
    }

    /// Aspirate once, dispense differing volumes into several wells
    pub fn multi_dispense(
        &mut self,
        source: &Well,
        targets: &[DispenseTarget],
        options: &MultiDispenseOptions,
    ) -> Result<usize> {
        let commands = plan_multi_dispense(source, targets, options)?;
        self.append_all(commands, "multi-dispense")
    }

    /// Append commands that need no planning (comments, breaks)
    pub fn push(&mut self, command: Command) -> Result<()> {
        self.sequencer.append(command, &self.default_liquid_class)
    }

    fn append_all(&mut self, commands: Vec<Command>, kind: &str) -> Result<usize> {
        let count = commands.len();
        self.sequencer
            .extend(commands, &self.default_liquid_class)?;
        debug!("Planned {} commands with {}", count, kind);
        Ok(count)
    }
}
