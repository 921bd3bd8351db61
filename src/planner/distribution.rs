//! Reagent distribution planning
//!
//! A reagent that goes into many wells at the same volume is distributed with
//! the robot's native multi-dispense: one `R` command per destination
//! container, which lists the wells that must stay empty instead of the ones
//! that are filled. Each destination container gets its own source vessel,
//! labelled `{source_label}[NNN]`.

use super::tip_reuse::{plan_tip_reuse, TipReuseOptions};
use super::{round_volume, DispenseTarget, TransferRow, Well};
use crate::catalog::LabwareCatalog;
use crate::error::{Error, Result};
use crate::gwl::{Command, ReagentDistribution, DEFAULT_MULTI_LIQUID_CLASS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionOptions {
    /// Base label of the source vessels
    pub source_label: String,
    pub source_type: String,
    pub liquid_class: String,
    pub n_tip_reuse: u32,
    pub n_multi_disp: u32,
}

impl DistributionOptions {
    pub fn new(source_label: impl Into<String>, source_type: impl Into<String>) -> Self {
        Self {
            source_label: source_label.into(),
            source_type: source_type.into(),
            liquid_class: DEFAULT_MULTI_LIQUID_CLASS.to_string(),
            n_tip_reuse: 1,
            n_multi_disp: 5,
        }
    }

    /// Label of the source vessel feeding the `index`-th destination (0-based)
    #[must_use]
    pub fn source_label_for(&self, index: usize) -> String {
        format!("{}[{:03}]", self.source_label, index + 1)
    }
}

/// Positions of a `wells`-well container that are not in `positions`
#[must_use]
pub fn excluded_positions(wells: u32, positions: impl IntoIterator<Item = u32>) -> BTreeSet<u32> {
    let targeted: BTreeSet<u32> = positions.into_iter().collect();
    (1..=wells).filter(|p| !targeted.contains(p)).collect()
}

/// Plan reagent distribution for every destination container.
///
/// Containers whose wells do not all receive the same volume, or that name a
/// well more than once, fall back to tip-reuse batching from the same source
/// vessel. Zero-volume targets are
/// left out (they end up excluded). A Break closes the block when at least
/// one `R` command was planned.
pub fn plan_distribution(
    catalog: &LabwareCatalog,
    targets: &[DispenseTarget],
    options: &DistributionOptions,
) -> Result<Vec<Command>> {
    if options.n_tip_reuse == 0 || options.n_multi_disp == 0 {
        return Err(Error::Validation(
            "Tip reuse and multi-dispense counts must be at least 1".to_string(),
        ));
    }
    let source_max_volume = catalog.max_volume_of(&options.source_type)?;

    let mut groups: Vec<(&Well, Vec<(u32, f64)>)> = Vec::new();
    for target in targets {
        let volume = round_volume(target.volume);
        if volume <= 0.0 {
            continue;
        }
        let dest = &target.dest;
        match groups.iter_mut().find(|(first, _)| {
            first.rack_label == dest.rack_label && first.rack_type == dest.rack_type
        }) {
            Some((_, wells)) => wells.push((dest.position, volume)),
            None => groups.push((dest, vec![(dest.position, volume)])),
        }
    }

    let mut commands = Vec::new();
    let mut distributed = 0;
    for (index, (dest, wells)) in groups.into_iter().enumerate() {
        let source_label = options.source_label_for(index);
        let volume = wells[0].1;
        let total: f64 = wells.iter().map(|(_, v)| v).sum();
        if total > source_max_volume {
            return Err(Error::CapacityExceeded {
                target: source_label,
                labware_type: options.source_type.clone(),
            });
        }

        let uniform = wells.iter().all(|(_, v)| *v == volume);
        let distinct: BTreeSet<u32> = wells.iter().map(|(position, _)| *position).collect();
        if !uniform || distinct.len() < wells.len() {
            info!(
                "Wells of \"{}\" differ in volume or repeat; using tip-reuse batching",
                dest.rack_label
            );
            let rows: Vec<TransferRow> = wells
                .iter()
                .map(|&(position, volume)| TransferRow {
                    source: Well::new(&source_label, &options.source_type, 1),
                    dest: Well::new(&dest.rack_label, &dest.rack_type, position),
                    volume,
                })
                .collect();
            let fallback = TipReuseOptions::new(options.n_tip_reuse as usize)
                .with_liquid_class(&options.liquid_class);
            commands.extend(plan_tip_reuse(&rows, &fallback)?);
            continue;
        }

        let dest_wells = catalog.wells_of(&dest.rack_type)?;
        let mut rd = ReagentDistribution::new(
            source_label,
            &options.source_type,
            &dest.rack_label,
            &dest.rack_type,
            volume,
        );
        rd.dest_pos_end = dest_wells;
        rd.liquid_class = options.liquid_class.clone();
        rd.n_tip_reuse = options.n_tip_reuse;
        rd.n_multi_disp = options.n_multi_disp;
        rd.excluded_dest_wells =
            excluded_positions(dest_wells, wells.iter().map(|(position, _)| *position));
        debug!(
            "Distributing {} ul into {} wells of \"{}\"",
            volume,
            wells.len(),
            dest.rack_label
        );
        commands.push(Command::ReagentDistribution(rd));
        distributed += 1;
    }

    if distributed > 0 {
        commands.push(Command::Break);
    }
    Ok(commands)
}
