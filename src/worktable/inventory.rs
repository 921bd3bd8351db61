//! Labware inventory produced by worktable allocation

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const HEADER: [&str; 4] = [
    "labware_name",
    "labware_type",
    "target_location",
    "target_position",
];

/// One piece of labware and the worktable slot it was given
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabwareInventoryEntry {
    pub labware_name: String,
    pub labware_type: String,
    pub target_location: String,
    pub target_position: u32,
}

/// Ordered inventory of a run: tip boxes first, then other labware
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabwareInventory {
    entries: Vec<LabwareInventoryEntry>,
}

impl LabwareInventory {
    pub(crate) fn push(&mut self, entry: LabwareInventoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LabwareInventoryEntry] {
        &self.entries
    }

    pub fn get(&self, labware_name: &str) -> Option<&LabwareInventoryEntry> {
        self.entries.iter().find(|e| e.labware_name == labware_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tab-separated table with a header row
    pub fn to_tsv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(HEADER)?;
        for entry in &self.entries {
            writer.serialize(entry)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| Error::Validation(e.to_string()))
    }

    pub fn write_tsv(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_tsv()?)?;
        Ok(())
    }

    /// Read a table written by [`LabwareInventory::write_tsv`]
    pub fn from_tsv(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_reader(text.as_bytes());
        let entries = reader
            .deserialize()
            .collect::<std::result::Result<Vec<LabwareInventoryEntry>, _>>()?;
        Ok(Self { entries })
    }
}

impl<'a> IntoIterator for &'a LabwareInventory {
    type Item = &'a LabwareInventoryEntry;
    type IntoIter = std::slice::Iter<'a, LabwareInventoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory() -> LabwareInventory {
        let mut inv = LabwareInventory::default();
        inv.push(LabwareInventoryEntry {
            labware_name: "FCA, 200ul SBS[001]".to_string(),
            labware_type: "FCA, 200ul SBS".to_string(),
            target_location: "FCA Thru Deck 4Pos".to_string(),
            target_position: 1,
        });
        inv.push(LabwareInventoryEntry {
            labware_name: "Sample plate".to_string(),
            labware_type: "96 Well Skirted PCR".to_string(),
            target_location: "MP 3Pos Fluent".to_string(),
            target_position: 4,
        });
        inv
    }

    #[test]
    fn test_tsv_layout() {
        let tsv = inventory().to_tsv().unwrap();
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(
            lines[0],
            "labware_name\tlabware_type\ttarget_location\ttarget_position"
        );
        assert_eq!(
            lines[2],
            "Sample plate\t96 Well Skirted PCR\tMP 3Pos Fluent\t4"
        );
    }

    #[test]
    fn test_empty_inventory_has_header() {
        let tsv = LabwareInventory::default().to_tsv().unwrap();
        assert_eq!(tsv.lines().count(), 1);
    }

    #[test]
    fn test_tsv_read_back() {
        let inv = inventory();
        let parsed = LabwareInventory::from_tsv(&inv.to_tsv().unwrap()).unwrap();
        assert_eq!(parsed, inv);
        assert_eq!(parsed.get("Sample plate").unwrap().target_position, 4);
    }
}
