//! Tip-reuse batching
//!
//! Each transfer becomes an aspirate/dispense pair. Rows are spread over the
//! channels of the head in turn and grouped into tip batches, so that the
//! same channel keeps serving neighbouring wells until its tip has been used
//! `n_tip_reuse` times.

use super::{round_volume, TransferRow};
use crate::error::{Error, Result};
use crate::gwl::{Command, Transfer, DEFAULT_LIQUID_CLASS};
use serde::{Deserialize, Serialize};

/// Channels on the pipetting head
pub const CHANNELS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipReuseOptions {
    /// Operations per tip before it goes to waste
    pub n_tip_reuse: usize,
    pub liquid_class: String,
    /// Drop rows whose rounded volume is not positive
    pub skip_zero: bool,
}

impl TipReuseOptions {
    pub fn new(n_tip_reuse: usize) -> Self {
        Self {
            n_tip_reuse,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_liquid_class(mut self, liquid_class: impl Into<String>) -> Self {
        self.liquid_class = liquid_class.into();
        self
    }
}

impl Default for TipReuseOptions {
    fn default() -> Self {
        Self {
            n_tip_reuse: 1,
            liquid_class: DEFAULT_LIQUID_CLASS.to_string(),
            skip_zero: true,
        }
    }
}

/// Channel assigned to each of `n` operations, cycling over the head
#[must_use]
pub fn channel_order(n: usize) -> Vec<usize> {
    (0..n).map(|i| i % CHANNELS).collect()
}

/// Tip batch of each operation: advances once `n_tip_reuse` full channel
/// cycles have completed.
#[must_use]
pub fn tip_batch(channel_order: &[usize], n_tip_reuse: usize) -> Vec<usize> {
    let n_tip_reuse = n_tip_reuse.max(1);
    let mut cycle = 0;
    channel_order
        .iter()
        .enumerate()
        .map(|(i, &channel)| {
            if i > 0 && channel == 0 {
                cycle += 1;
            }
            cycle / n_tip_reuse
        })
        .collect()
}

/// Plan aspirate/dispense pairs with a Waste after every `n_tip_reuse`-th
/// pair and after the last one.
pub fn plan_tip_reuse(rows: &[TransferRow], options: &TipReuseOptions) -> Result<Vec<Command>> {
    if options.n_tip_reuse == 0 {
        return Err(Error::Validation(
            "Tip reuse count must be at least 1".to_string(),
        ));
    }

    let rows: Vec<(f64, &TransferRow)> = rows
        .iter()
        .map(|row| (round_volume(row.volume), row))
        .filter(|(volume, _)| !options.skip_zero || *volume > 0.0)
        .collect();

    let channels = channel_order(rows.len());
    let batches = tip_batch(&channels, options.n_tip_reuse);
    let mut ordered: Vec<(usize, usize, u32, f64, &TransferRow)> = rows
        .into_iter()
        .zip(channels.into_iter().zip(batches))
        .map(|((volume, row), (channel, batch))| (batch, channel, row.dest.position, volume, row))
        .collect();
    ordered.sort_by_key(|(batch, channel, position, _, _)| (*batch, *channel, *position));

    let total = ordered.len();
    let mut commands = Vec::with_capacity(total * 2 + total / options.n_tip_reuse + 1);
    for (i, (_, _, _, volume, row)) in ordered.into_iter().enumerate() {
        let aspirate = Transfer::new(
            &row.source.rack_label,
            &row.source.rack_type,
            row.source.position,
            volume,
        )
        .with_liquid_class(&options.liquid_class);
        let dispense = Transfer::new(
            &row.dest.rack_label,
            &row.dest.rack_type,
            row.dest.position,
            volume,
        )
        .with_liquid_class(&options.liquid_class);
        commands.push(Command::Aspirate(aspirate));
        commands.push(Command::Dispense(dispense));

        if (i + 1) % options.n_tip_reuse == 0 || i + 1 == total {
            commands.push(Command::Waste);
        }
    }
    Ok(commands)
}
