//! Variable-volume multi-dispense
//!
//! One aspirate covers up to `n_multi_disp` dispenses of differing volumes,
//! plus a fixed overage so the last dispense is not short. Used for diluent
//! and similar liquids where every well needs its own volume.

use super::{round_volume, DispenseTarget, Well};
use crate::error::{Error, Result};
use crate::gwl::{Command, Transfer, DEFAULT_MULTI_LIQUID_CLASS};
use serde::{Deserialize, Serialize};

/// Extra volume drawn up on top of the summed dispenses
pub const OVERAGE_FACTOR: f64 = 1.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiDispenseOptions {
    /// Dispenses per aspirate
    pub n_multi_disp: usize,
    pub liquid_class: String,
}

impl MultiDispenseOptions {
    pub fn new(n_multi_disp: usize) -> Self {
        Self {
            n_multi_disp,
            liquid_class: DEFAULT_MULTI_LIQUID_CLASS.to_string(),
        }
    }
}

/// Plan aspirate, dispenses, waste cycles until every target with a positive
/// volume is served. Zero-volume targets are skipped and do not count
/// towards a cycle.
pub fn plan_multi_dispense(
    source: &Well,
    targets: &[DispenseTarget],
    options: &MultiDispenseOptions,
) -> Result<Vec<Command>> {
    if options.n_multi_disp == 0 {
        return Err(Error::Validation(
            "Multi-dispense count must be at least 1".to_string(),
        ));
    }

    let served: Vec<(f64, &DispenseTarget)> = targets
        .iter()
        .map(|t| (round_volume(t.volume), t))
        .filter(|(volume, _)| *volume > 0.0)
        .collect();

    let mut commands = Vec::new();
    for cycle in served.chunks(options.n_multi_disp) {
        let total: f64 = cycle.iter().map(|(volume, _)| volume).sum();
        let aspirate = Transfer::new(
            &source.rack_label,
            &source.rack_type,
            source.position,
            round_volume(total * OVERAGE_FACTOR),
        )
        .with_liquid_class(&options.liquid_class);
        commands.push(Command::Aspirate(aspirate));

        for (volume, target) in cycle {
            let dispense = Transfer::new(
                &target.dest.rack_label,
                &target.dest.rack_type,
                target.dest.position,
                *volume,
            )
            .with_liquid_class(&options.liquid_class);
            commands.push(Command::Dispense(dispense));
        }
        commands.push(Command::Waste);
    }
    Ok(commands)
}
