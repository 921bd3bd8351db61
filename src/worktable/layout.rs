//! Worktable target locations and their capacity tables

use crate::error::{EntryKind, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A slot category on the worktable (a carrier, nest or rack)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetLocation {
    pub id: String,
    /// Highest position number on this location
    pub position_count: u32,
    /// Edge positions that are never handed out
    #[serde(default)]
    pub border: BTreeSet<u32>,
}

impl TargetLocation {
    /// Number of positions that can actually be assigned
    #[must_use]
    pub fn usable_positions(&self) -> usize {
        (1..=self.position_count)
            .filter(|p| !self.border.contains(p))
            .count()
    }
}

/// All target locations known for one worktable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktableLayout {
    locations: BTreeMap<String, TargetLocation>,
}

impl WorktableLayout {
    pub fn new(locations: Vec<TargetLocation>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for location in locations {
            if location.position_count == 0 {
                return Err(Error::Config(format!(
                    "Target location \"{}\" has no positions",
                    location.id
                )));
            }
            if let Some(previous) = map.insert(location.id.clone(), location) {
                return Err(Error::Config(format!(
                    "Target location \"{}\" defined more than once",
                    previous.id
                )));
            }
        }
        Ok(Self { locations: map })
    }

    pub fn get(&self, id: &str) -> Result<&TargetLocation> {
        self.locations
            .get(id)
            .ok_or_else(|| Error::not_found(EntryKind::TargetLocation, id))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.locations.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetLocation> {
        self.locations.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
