//! `fluent-gwl tip`

use crate::cli::session::Session;
use anyhow::Result;

pub fn run_tip_command(session: &Session, volume: f64, container: Option<&str>) -> Result<()> {
    let tips = session.config.tip_selector(&session.catalog)?;
    let tip = tips.select(volume, container)?;
    println!("{}", tip.id);
    Ok(())
}
