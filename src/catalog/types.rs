//! Type definitions for labware, tips and fixtures

use serde::{Deserialize, Serialize};

/// Broad physical category of a labware type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabwareCategory {
    Tip,
    Plate,
    Tube,
    Trough,
}

/// Reusable fixture that a plate can sit on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FixtureKind {
    #[serde(rename = "pcr_adapter_96")]
    PcrAdapter96,
    #[serde(rename = "pcr_adapter_384")]
    PcrAdapter384,
    #[serde(rename = "magnet_96")]
    Magnet96,
}

impl FixtureKind {
    /// Labware type of the fixture itself
    #[must_use]
    pub fn labware_type(&self) -> &'static str {
        match self {
            FixtureKind::PcrAdapter96 => "PCR Adapter 96 Well",
            FixtureKind::PcrAdapter384 => "PCR Adapter 384 Well",
            FixtureKind::Magnet96 => "Alpaqua Magnum FLX 96 well",
        }
    }

    /// Virtual location the mounted plate is reported at
    #[must_use]
    pub fn plate_location(&self) -> &'static str {
        match self {
            FixtureKind::PcrAdapter96 => "PCR96WellAdapter_CoverSite",
            FixtureKind::PcrAdapter384 => "PCR96WellAdapter_CoverSite_1",
            FixtureKind::Magnet96 => "96MicroplateSkirted_CoverSite_6",
        }
    }

    /// Inventory name of the fixture carrying `rack_label`
    #[must_use]
    pub fn fixture_label(&self, rack_label: &str) -> String {
        match self {
            FixtureKind::PcrAdapter96 | FixtureKind::PcrAdapter384 => {
                format!("PCR Adapter for {rack_label}")
            }
            FixtureKind::Magnet96 => format!("Magnet for {rack_label}"),
        }
    }
}

/// A plate that is always placed on a fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mounting {
    pub fixture: FixtureKind,
    /// Labware type of the plate once taken off the fixture
    pub plate_type: String,
}

/// Catalog definition of a labware type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabwareType {
    pub id: String,
    pub wells: u32,
    pub max_volume: f64,
    pub category: LabwareCategory,
    /// Candidate worktable target locations, in order of preference
    #[serde(default)]
    pub target_locations: Vec<String>,
    /// Tip volumes usable with this container; `None` means unconstrained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tips: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mounted_on: Option<Mounting>,
}

impl LabwareType {
    /// Containers with exactly one addressable position
    #[must_use]
    pub fn is_single_well(&self) -> bool {
        self.wells == 1
    }

    /// Smallest allowed tip volume, if the container restricts tips
    #[must_use]
    pub fn min_allowed_tip(&self) -> Option<f64> {
        self.allowed_tips
            .as_ref()?
            .iter()
            .copied()
            .fold(None, |min, v| match min {
                Some(m) if m <= v => Some(m),
                _ => Some(v),
            })
    }
}

/// Catalog definition of a disposable tip type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipType {
    pub id: String,
    /// Largest volume usable with dynamic tip handling
    pub dth_max_volume: f64,
    /// Labware type of the box the tips come in
    pub tip_box: String,
}
