//! `fluent-gwl catalog`

use crate::catalog::LabwareCatalog;
use crate::cli::args::CatalogListing;
use anyhow::Result;

pub fn run_catalog_command(catalog: &LabwareCatalog, listing: Option<CatalogListing>) -> Result<()> {
    let show = |kind: CatalogListing| listing.map_or(true, |l| l == kind);

    if show(CatalogListing::Labware) {
        println!("Labware types:");
        for labware in catalog.labware_types() {
            println!(
                "  {:<32} {:>4} wells {:>9} ul  {}",
                labware.id,
                labware.wells,
                labware.max_volume,
                labware.target_locations.join(", ")
            );
        }
    }

    if show(CatalogListing::Tips) {
        println!("Tip types:");
        for tip in catalog.tip_types() {
            println!("  {:<32} DTH {:>6} ul", tip.id, tip.dth_max_volume);
        }
    }

    if show(CatalogListing::LiquidClasses) {
        println!("Liquid classes:");
        for liquid_class in catalog.liquid_classes() {
            println!("  {liquid_class}");
        }
    }
    Ok(())
}
