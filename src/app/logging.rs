//! Logging configuration and initialization

use crate::app::config::AppConfig;
use anyhow::Result;
use tracing::{debug, trace};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

/// Swaps the active filter once the session configuration is known
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// Re-apply the filter of `config`, e.g. after its `log_filter` was set
    pub fn apply(&self, config: &AppConfig) -> Result<()> {
        let filter = EnvFilter::try_new(config.log_level())?;
        self.filter.reload(filter)?;
        trace!("Log filter set to {}", config.log_level());
        Ok(())
    }
}

/// Initialize tracing for the process; logs go to stderr so stdout stays clean
pub fn init_logging(config: &AppConfig) -> LogHandle {
    let (filter, handle) = reload::Layer::new(EnvFilter::new(config.log_level()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(config.verbose >= 2)
                .with_thread_ids(config.verbose >= 3)
                .with_line_number(config.verbose >= 3),
        )
        .init();

    debug!("fluent-gwl started with verbosity level: {}", config.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
    LogHandle { filter: handle }
}
