//! Labware catalog
//!
//! Static, read-only lookup of labware types, tip types, liquid classes and
//! the worktable layout. A catalog is built once from a YAML or JSON document
//! and never mutated afterwards; every lookup is side-effect free.
//!
//! A default document ships inside the binary (`data/catalog.yaml`). Custom
//! catalogs use the same shape:
//!
//! ```yaml
//! labware:
//!   - id: "96 Well Skirted PCR"
//!     wells: 96
//!     max_volume: 200
//!     category: plate
//!     target_locations: ["MP 3Pos Fluent"]
//! tip_types:
//!   - id: "FCA, 200ul SBS"
//!     dth_max_volume: 190
//!     tip_box: "FCA, 200ul SBS"
//! liquid_classes: ["Water Free Single"]
//! worktable:
//!   - id: "MP 3Pos Fluent"
//!     position_count: 18
//!     border: [1, 18]
//! ```

pub mod types;

pub use types::{FixtureKind, LabwareCategory, LabwareType, Mounting, TipType};

use crate::error::{EntryKind, Error, Result};
use crate::worktable::layout::{TargetLocation, WorktableLayout};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.yaml");

/// On-disk shape of a catalog definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub labware: Vec<LabwareType>,
    #[serde(default)]
    pub tip_types: Vec<TipType>,
    #[serde(default)]
    pub liquid_classes: Vec<String>,
    #[serde(default)]
    pub worktable: Vec<TargetLocation>,
}

/// Read-only registry of labware, tips, liquid classes and worktable slots
#[derive(Debug, Clone)]
pub struct LabwareCatalog {
    labware: BTreeMap<String, LabwareType>,
    /// Sorted by ascending DTH volume
    tip_types: Vec<TipType>,
    liquid_classes: BTreeSet<String>,
    worktable: WorktableLayout,
}

impl LabwareCatalog {
    /// The catalog embedded in the binary
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let document: CatalogDocument = serde_yaml::from_str(content)?;
        Self::from_document(document)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: CatalogDocument = serde_json::from_str(content)?;
        Self::from_document(document)
    }

    /// Load a catalog file; `.json` files are read as JSON, everything else as YAML
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        debug!("Loading labware catalog from {}", path.display());
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Build a catalog, checking that every cross reference resolves
    pub fn from_document(document: CatalogDocument) -> Result<Self> {
        let mut labware = BTreeMap::new();
        for lw in document.labware {
            if lw.wells == 0 {
                return Err(Error::Config(format!(
                    "Labware type \"{}\" has no wells",
                    lw.id
                )));
            }
            if let Some(previous) = labware.insert(lw.id.clone(), lw) {
                return Err(Error::Config(format!(
                    "Labware type \"{}\" defined more than once",
                    previous.id
                )));
            }
        }

        for lw in labware.values() {
            if let Some(mounting) = &lw.mounted_on {
                if !labware.contains_key(&mounting.plate_type) {
                    return Err(Error::Config(format!(
                        "Labware type \"{}\" is mounted with unknown plate type \"{}\"",
                        lw.id, mounting.plate_type
                    )));
                }
            }
        }

        let mut tip_types = document.tip_types;
        for tip in &tip_types {
            match labware.get(&tip.tip_box) {
                Some(lw) if lw.category == LabwareCategory::Tip => {}
                Some(_) => {
                    return Err(Error::Config(format!(
                        "Tip box \"{}\" of tip type \"{}\" is not a tip labware",
                        tip.tip_box, tip.id
                    )))
                }
                None => {
                    return Err(Error::Config(format!(
                        "Tip type \"{}\" refers to unknown tip box \"{}\"",
                        tip.id, tip.tip_box
                    )))
                }
            }
        }
        tip_types.sort_by(|a, b| a.dth_max_volume.total_cmp(&b.dth_max_volume));

        let catalog = Self {
            labware,
            tip_types,
            liquid_classes: document.liquid_classes.into_iter().collect(),
            worktable: WorktableLayout::new(document.worktable)?,
        };
        debug!(
            "Catalog ready: {} labware types, {} tip types, {} liquid classes, {} target locations",
            catalog.labware.len(),
            catalog.tip_types.len(),
            catalog.liquid_classes.len(),
            catalog.worktable.len()
        );
        Ok(catalog)
    }

    pub fn get_labware_type(&self, id: &str) -> Result<&LabwareType> {
        self.labware
            .get(id)
            .ok_or_else(|| Error::not_found(EntryKind::LabwareType, id))
    }

    pub fn get_tip_type(&self, id: &str) -> Result<&TipType> {
        self.tip_types
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::not_found(EntryKind::TipType, id))
    }

    pub fn get_liquid_class(&self, id: &str) -> Result<&str> {
        self.liquid_classes
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| Error::not_found(EntryKind::LiquidClass, id))
    }

    #[must_use]
    pub fn has_liquid_class(&self, id: &str) -> bool {
        self.liquid_classes.contains(id)
    }

    pub fn wells_of(&self, id: &str) -> Result<u32> {
        Ok(self.get_labware_type(id)?.wells)
    }

    pub fn max_volume_of(&self, id: &str) -> Result<f64> {
        Ok(self.get_labware_type(id)?.max_volume)
    }

    /// Allowed tip volumes of a container; `None` when unconstrained
    pub fn allowed_tips_of(&self, id: &str) -> Result<Option<&[f64]>> {
        Ok(self.get_labware_type(id)?.allowed_tips.as_deref())
    }

    pub fn labware_types(&self) -> impl Iterator<Item = &LabwareType> {
        self.labware.values()
    }

    /// Tip types ordered by ascending DTH volume
    pub fn tip_types(&self) -> &[TipType] {
        &self.tip_types
    }

    pub fn liquid_classes(&self) -> impl Iterator<Item = &str> {
        self.liquid_classes.iter().map(String::as_str)
    }

    pub fn worktable(&self) -> &WorktableLayout {
        &self.worktable
    }
}
