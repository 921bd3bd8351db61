//! Pipetting order for 384-well plates
//!
//! On a 384-well plate the 8 channels of the head land on every other well,
//! so visiting odd positions first and even positions second needs fewer
//! head moves than plain numeric order.

use super::Addressed;
use crate::catalog::LabwareCatalog;
use crate::error::Result;

const REORDERED_WELLS: u32 = 384;

/// Odd positions ascending, then even positions ascending
#[must_use]
pub fn reorder_384(positions: &[u32]) -> Vec<u32> {
    let mut out = positions.to_vec();
    out.sort_by_key(|p| (p % 2 == 0, *p));
    out
}

/// Reorder positions on a container with `wells` wells; only 384-well
/// containers change.
#[must_use]
pub fn reorder(positions: &[u32], wells: u32) -> Vec<u32> {
    if wells == REORDERED_WELLS {
        reorder_384(positions)
    } else {
        positions.to_vec()
    }
}

/// Reorder rows within each destination container.
///
/// Rows are grouped by `(rack_label, rack_type)`; groups keep the order in
/// which they were first seen and only groups on 384-well containers are
/// sorted.
pub fn reorder_by_labware<T: Addressed>(catalog: &LabwareCatalog, rows: Vec<T>) -> Result<Vec<T>> {
    let mut groups: Vec<((String, String), Vec<T>)> = Vec::new();
    for row in rows {
        let dest = row.destination();
        let key = (dest.rack_label.clone(), dest.rack_type.clone());
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(row),
            None => groups.push((key, vec![row])),
        }
    }

    let mut out = Vec::new();
    for ((_, rack_type), mut members) in groups {
        if catalog.wells_of(&rack_type)? == REORDERED_WELLS {
            members.sort_by_key(|row| {
                let p = row.destination().position;
                (p % 2 == 0, p)
            });
        }
        out.extend(members);
    }
    Ok(out)
}
