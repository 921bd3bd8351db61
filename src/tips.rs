//! Tip type selection
//!
//! Picks the smallest tip type whose dynamic tip handling (DTH) volume can
//! hold a requested volume. Containers that declare `allowed_tips` raise the
//! effective volume to 75% of their smallest allowed tip, so that a narrow or
//! deep vessel is never approached with a tip that is too short for it.

use crate::catalog::{LabwareCatalog, TipType};
use crate::error::{Error, Result};
use tracing::trace;

/// Fraction of the smallest allowed tip used as the minimum effective volume
pub const ALLOWED_TIP_FLOOR: f64 = 0.75;

/// Chooses tip types for volumes from the tip types enabled for a session
#[derive(Debug, Clone)]
pub struct TipSelector<'a> {
    catalog: &'a LabwareCatalog,
    /// Ascending DTH volume
    tips: Vec<&'a TipType>,
}

impl<'a> TipSelector<'a> {
    /// Selector over every tip type in the catalog
    #[must_use]
    pub fn new(catalog: &'a LabwareCatalog) -> Self {
        Self {
            catalog,
            tips: catalog.tip_types().iter().collect(),
        }
    }

    /// Selector restricted to the given tip type ids
    pub fn with_tip_types<S: AsRef<str>>(catalog: &'a LabwareCatalog, ids: &[S]) -> Result<Self> {
        let mut tips = ids
            .iter()
            .map(|id| catalog.get_tip_type(id.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        tips.sort_by(|a, b| a.dth_max_volume.total_cmp(&b.dth_max_volume));
        tips.dedup_by(|a, b| a.id == b.id);
        Ok(Self { catalog, tips })
    }

    pub fn tip_types(&self) -> impl Iterator<Item = &'a TipType> + '_ {
        self.tips.iter().copied()
    }

    /// Smallest enabled tip type whose DTH volume strictly exceeds `volume`
    pub fn select(&self, volume: f64, container_type: Option<&str>) -> Result<&'a TipType> {
        if !volume.is_finite() || volume < 0.0 {
            return Err(Error::Validation(format!(
                "Volume must be a non-negative number, got {volume}"
            )));
        }

        let mut effective = volume;
        if let Some(container) = container_type {
            let labware = self.catalog.get_labware_type(container)?;
            if let Some(min_tip) = labware.min_allowed_tip() {
                effective = effective.max(min_tip * ALLOWED_TIP_FLOOR);
            }
        }

        let tip = self
            .tips
            .iter()
            .find(|t| t.dth_max_volume > effective)
            .copied()
            .ok_or_else(|| Error::NoTipAvailable {
                volume,
                container: container_type.map(str::to_string),
            })?;
        trace!(
            "Selected tip \"{}\" for {} ul (effective {} ul)",
            tip.id,
            volume,
            effective
        );
        Ok(tip)
    }
}
