//! Worktable position allocation
//!
//! Walks a finished command log and gives every piece of labware it touches,
//! plus the tip boxes it needs, its own slot on the worktable. Slots are
//! handed out per target location in increasing order, skipping border
//! positions.

use super::inventory::{LabwareInventory, LabwareInventoryEntry};
use super::layout::WorktableLayout;
use crate::catalog::{FixtureKind, LabwareCatalog, LabwareCategory, LabwareType};
use crate::error::{EntryKind, Error, Result};
use crate::gwl::Command;
use crate::planner::CHANNELS;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Tips consumed by one reagent distribution (one per channel)
pub const TIPS_PER_DISTRIBUTION: u32 = CHANNELS as u32;

/// Trough racks are numbered in two banks of five
const TROUGH_BANK: u32 = 5;

/// Occupancy counters for the target locations of one allocation pass
#[derive(Debug, Clone)]
pub struct WorktableSlotMap<'a> {
    layout: &'a WorktableLayout,
    counters: HashMap<String, u32>,
}

impl<'a> WorktableSlotMap<'a> {
    pub fn new(layout: &'a WorktableLayout) -> Self {
        Self {
            layout,
            counters: HashMap::new(),
        }
    }

    /// Highest position handed out so far on `location` (0 when unused)
    #[must_use]
    pub fn occupied(&self, location: &str) -> u32 {
        self.counters.get(location).copied().unwrap_or(0)
    }

    /// Next free, non-border position on `location` for a piece of
    /// `labware_type`. A full location leaves the counter untouched.
    pub fn next(&mut self, location: &str, labware_type: &str) -> Result<u32> {
        let target = self.layout.get(location)?;
        let mut position = self.occupied(location);
        loop {
            position += 1;
            if position > target.position_count {
                return Err(Error::CapacityExceeded {
                    target: location.to_string(),
                    labware_type: labware_type.to_string(),
                });
            }
            if !target.border.contains(&position) {
                break;
            }
        }
        self.counters.insert(location.to_string(), position);
        Ok(position)
    }
}

/// Tips used per tip type: one per Aspirate, a full head per distribution
#[must_use]
pub fn count_tips(commands: &[Command]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for command in commands {
        let (tip_type, tips) = match command {
            Command::Aspirate(t) => (t.tip_type.as_deref(), 1),
            Command::ReagentDistribution(rd) => (rd.tip_type.as_deref(), TIPS_PER_DISTRIBUTION),
            _ => continue,
        };
        if let Some(tip_type) = tip_type {
            *counts.entry(tip_type.to_string()).or_insert(0) += tips;
        }
    }
    counts
}

/// Boxes needed to hold `tips` tips
#[must_use]
pub fn boxes_needed(tips: u32, tips_per_box: u32) -> u32 {
    tips.div_ceil(tips_per_box.max(1))
}

/// Rack labels of a command log with their labware type, in first-seen order
#[must_use]
pub fn registered_labware(commands: &[Command]) -> Vec<(String, String)> {
    let mut seen: Vec<(String, String)> = Vec::new();
    for command in commands {
        for (label, rack_type) in command.racks() {
            match seen.iter().find(|(l, _)| l == label) {
                Some((_, first_type)) if first_type != rack_type => warn!(
                    "\"{}\" used as both \"{}\" and \"{}\"; keeping the first",
                    label, first_type, rack_type
                ),
                Some(_) => {}
                None => seen.push((label.to_string(), rack_type.to_string())),
            }
        }
    }
    seen
}

/// Assigns worktable slots to the labware of a run
pub struct WorktableAllocator<'a> {
    catalog: &'a LabwareCatalog,
}

impl<'a> WorktableAllocator<'a> {
    pub fn new(catalog: &'a LabwareCatalog) -> Self {
        Self { catalog }
    }

    /// Build the labware inventory for `commands`.
    ///
    /// Tip boxes come first, largest tips first, then every rack label in the
    /// order the log first uses it.
    pub fn allocate(&self, commands: &[Command]) -> Result<LabwareInventory> {
        let mut slots = WorktableSlotMap::new(self.catalog.worktable());
        let mut inventory = LabwareInventory::default();

        for (label, box_type) in self.tip_boxes(commands)? {
            let (location, position) = self.assign(&mut slots, box_type)?;
            debug!("Tip box \"{}\" at {} #{}", label, location, position);
            inventory.push(LabwareInventoryEntry {
                labware_name: label,
                labware_type: box_type.id.clone(),
                target_location: location,
                target_position: position,
            });
        }

        let mut fixture_uses: HashMap<FixtureKind, u32> = HashMap::new();
        for (label, rack_type) in registered_labware(commands) {
            let labware = self.catalog.get_labware_type(&rack_type)?;
            let (location, mut position) = self.assign(&mut slots, labware)?;

            if let Some(mounting) = &labware.mounted_on {
                let uses = fixture_uses.entry(mounting.fixture).or_insert(0);
                *uses += 1;
                inventory.push(LabwareInventoryEntry {
                    labware_name: mounting.fixture.fixture_label(&label),
                    labware_type: mounting.fixture.labware_type().to_string(),
                    target_location: location,
                    target_position: position,
                });
                inventory.push(LabwareInventoryEntry {
                    labware_name: label,
                    labware_type: mounting.plate_type.clone(),
                    target_location: mounting.fixture.plate_location().to_string(),
                    target_position: *uses,
                });
                continue;
            }

            if labware.category == LabwareCategory::Trough {
                position = fold_trough_position(position);
            }
            debug!("\"{}\" at {} #{}", label, location, position);
            inventory.push(LabwareInventoryEntry {
                labware_name: label,
                labware_type: rack_type,
                target_location: location,
                target_position: position,
            });
        }

        info!("Allocated {} pieces of labware", inventory.len());
        Ok(inventory)
    }

    /// Tip box labels and box types, largest tips first then by label
    fn tip_boxes(&self, commands: &[Command]) -> Result<Vec<(String, &'a LabwareType)>> {
        let mut boxes = Vec::new();
        for (tip_type, tips) in count_tips(commands) {
            let tip = self.catalog.get_tip_type(&tip_type)?;
            let box_type = self.catalog.get_labware_type(&tip.tip_box)?;
            let n = boxes_needed(tips, box_type.wells);
            debug!("{} tips of \"{}\" need {} boxes", tips, tip_type, n);
            boxes.extend((1..=n).map(|i| (format!("{tip_type}[{i:03}]"), box_type)));
        }
        boxes.sort_by(|(a_label, a), (b_label, b)| {
            b.max_volume
                .total_cmp(&a.max_volume)
                .then_with(|| a_label.cmp(b_label))
        });
        Ok(boxes)
    }

    /// First candidate location of `labware` with a free slot
    fn assign(
        &self,
        slots: &mut WorktableSlotMap<'_>,
        labware: &LabwareType,
    ) -> Result<(String, u32)> {
        let layout = self.catalog.worktable();
        let mut last_error = None;
        for location in labware
            .target_locations
            .iter()
            .filter(|l| layout.contains(l))
        {
            match slots.next(location, &labware.id) {
                Ok(position) => return Ok((location.clone(), position)),
                Err(e @ Error::CapacityExceeded { .. }) => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }
        Err(last_error.unwrap_or_else(|| {
            let id = labware
                .target_locations
                .first()
                .cloned()
                .unwrap_or_else(|| labware.id.clone());
            Error::not_found(EntryKind::TargetLocation, id)
        }))
    }
}

/// Map a trough rack slot to its physical bank numbering (1-5 <-> 6-10)
#[must_use]
pub fn fold_trough_position(position: u32) -> u32 {
    if position <= TROUGH_BANK {
        position + TROUGH_BANK
    } else {
        position - TROUGH_BANK
    }
}
