use super::GwlConfig;
use crate::error::{Error, Result};

pub const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate_config(config: &GwlConfig) -> Result<()> {
        if config.default_liquid_class.trim().is_empty() {
            return Err(Error::Config(
                "default_liquid_class cannot be empty".to_string(),
            ));
        }

        if config.tip_types.is_empty() {
            return Err(Error::Config(
                "tip_types must name at least one tip type".to_string(),
            ));
        }

        if let Some(empty) = config.tip_types.iter().position(|t| t.trim().is_empty()) {
            return Err(Error::Config(format!(
                "tip_types entry {} is empty",
                empty + 1
            )));
        }

        if let Some(log_level) = &config.log_level {
            Self::validate_log_level(log_level)?;
        }

        Ok(())
    }

    /// Accepts a plain level or a filter directive list such as
    /// `info,fluent_gwl::worktable=trace`
    pub fn validate_log_level(log_level: &str) -> Result<()> {
        let valid = !log_level.trim().is_empty()
            && log_level.split(',').all(|directive| {
                let level = directive.rsplit('=').next().unwrap_or(directive).trim();
                VALID_LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
            });
        if !valid {
            return Err(Error::Config(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                log_level, VALID_LOG_LEVELS
            )));
        }
        Ok(())
    }
}
