//! Worklist command model
//!
//! Commands are plain data. They are validated, and their derived fields
//! (tip type, forced positions, substituted liquid classes) filled in, when
//! they are appended to a [`RunSequencer`](super::RunSequencer).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Liquid class used when a caller does not name one
pub const DEFAULT_LIQUID_CLASS: &str = "Water Free Single";

/// Liquid class used for reagent distribution when a caller does not name one
pub const DEFAULT_MULTI_LIQUID_CLASS: &str = "Water Free Multi";

/// A single aspirate or dispense on one position of one container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    /// Container instance name on the worktable
    pub rack_label: String,
    pub rack_id: Option<String>,
    /// Catalog labware type of the container
    pub rack_type: String,
    /// 1-based position within the container
    pub position: u32,
    pub tube_id: Option<String>,
    pub volume: f64,
    pub liquid_class: String,
    /// Filled in by the sequencer
    pub tip_type: Option<String>,
    pub tip_mask: Option<String>,
    pub force_rack_type: Option<String>,
}

impl Transfer {
    pub fn new(
        rack_label: impl Into<String>,
        rack_type: impl Into<String>,
        position: u32,
        volume: f64,
    ) -> Self {
        Self {
            rack_label: rack_label.into(),
            rack_id: None,
            rack_type: rack_type.into(),
            position,
            tube_id: None,
            volume,
            liquid_class: DEFAULT_LIQUID_CLASS.to_string(),
            tip_type: None,
            tip_mask: None,
            force_rack_type: None,
        }
    }

    #[must_use]
    pub fn with_liquid_class(mut self, liquid_class: impl Into<String>) -> Self {
        self.liquid_class = liquid_class.into();
        self
    }

    #[must_use]
    pub fn with_rack_id(mut self, rack_id: impl Into<String>) -> Self {
        self.rack_id = Some(rack_id.into());
        self
    }

    #[must_use]
    pub fn with_tip_mask(mut self, tip_mask: impl Into<String>) -> Self {
        self.tip_mask = Some(tip_mask.into());
        self
    }
}

/// One aspirate feeding a multi-dispense over a whole destination container.
///
/// Every destination position from `dest_pos_start` to `dest_pos_end` that is
/// not listed in `excluded_dest_wells` receives `volume`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReagentDistribution {
    pub src_rack_label: String,
    pub src_rack_id: Option<String>,
    pub src_rack_type: String,
    pub src_pos_start: u32,
    pub src_pos_end: u32,
    pub dest_rack_label: String,
    pub dest_rack_id: Option<String>,
    pub dest_rack_type: String,
    pub dest_pos_start: u32,
    pub dest_pos_end: u32,
    /// Volume per dispense
    pub volume: f64,
    pub liquid_class: String,
    /// Number of times a tip is reused
    pub n_tip_reuse: u32,
    /// Number of dispenses per aspirate
    pub n_multi_disp: u32,
    pub direction: u32,
    pub excluded_dest_wells: BTreeSet<u32>,
    /// Filled in by the sequencer
    pub tip_type: Option<String>,
}

impl ReagentDistribution {
    pub fn new(
        src_rack_label: impl Into<String>,
        src_rack_type: impl Into<String>,
        dest_rack_label: impl Into<String>,
        dest_rack_type: impl Into<String>,
        volume: f64,
    ) -> Self {
        Self {
            src_rack_label: src_rack_label.into(),
            src_rack_id: None,
            src_rack_type: src_rack_type.into(),
            src_pos_start: 1,
            src_pos_end: 1,
            dest_rack_label: dest_rack_label.into(),
            dest_rack_id: None,
            dest_rack_type: dest_rack_type.into(),
            dest_pos_start: 1,
            dest_pos_end: 1,
            volume,
            liquid_class: DEFAULT_MULTI_LIQUID_CLASS.to_string(),
            n_tip_reuse: 1,
            n_multi_disp: 5,
            direction: 0,
            excluded_dest_wells: BTreeSet::new(),
            tip_type: None,
        }
    }

    /// Volume drawn up by a single aspirate
    #[must_use]
    pub fn aspirate_volume(&self) -> f64 {
        self.volume * f64::from(self.n_multi_disp)
    }

    /// Excluded wells in wire form (`1;5;9`)
    #[must_use]
    pub fn excluded_wells_field(&self) -> String {
        self.excluded_dest_wells
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// One worklist instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Aspirate(Transfer),
    Dispense(Transfer),
    ReagentDistribution(ReagentDistribution),
    Comment(String),
    Waste,
    Flush,
    Break,
}

impl Command {
    pub fn comment(text: impl Into<String>) -> Self {
        Command::Comment(text.into())
    }

    /// Single-letter command id used on the wire
    #[must_use]
    pub fn id(&self) -> char {
        match self {
            Command::Aspirate(_) => 'A',
            Command::Dispense(_) => 'D',
            Command::ReagentDistribution(_) => 'R',
            Command::Comment(_) => 'C',
            Command::Waste => 'W',
            Command::Flush => 'F',
            Command::Break => 'B',
        }
    }

    /// Aspirate-like commands pick up liquid with a fresh or reused tip
    #[must_use]
    pub fn is_aspirate(&self) -> bool {
        matches!(self, Command::Aspirate(_) | Command::ReagentDistribution(_))
    }

    /// Container instances this command touches, as `(rack_label, rack_type)`
    #[must_use]
    pub fn racks(&self) -> Vec<(&str, &str)> {
        match self {
            Command::Aspirate(t) | Command::Dispense(t) => {
                vec![(t.rack_label.as_str(), t.rack_type.as_str())]
            }
            Command::ReagentDistribution(rd) => vec![
                (rd.src_rack_label.as_str(), rd.src_rack_type.as_str()),
                (rd.dest_rack_label.as_str(), rd.dest_rack_type.as_str()),
            ],
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn liquid_class(&self) -> Option<&str> {
        match self {
            Command::Aspirate(t) | Command::Dispense(t) => Some(&t.liquid_class),
            Command::ReagentDistribution(rd) => Some(&rd.liquid_class),
            _ => None,
        }
    }

    #[must_use]
    pub fn tip_type(&self) -> Option<&str> {
        match self {
            Command::Aspirate(t) | Command::Dispense(t) => t.tip_type.as_deref(),
            Command::ReagentDistribution(rd) => rd.tip_type.as_deref(),
            _ => None,
        }
    }
}
