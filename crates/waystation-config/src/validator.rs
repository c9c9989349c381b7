//! Configuration validation

use crate::Config;
use waystation_core::{Error, Result};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_logging(config)?;
    validate_stats(config)?;
    validate_database(config)?;

    Ok(())
}

fn validate_logging(config: &Config) -> Result<()> {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(Error::Config(format!(
            "Invalid log level: {} (must be one of {})",
            config.logging.level,
            LOG_LEVELS.join(", ")
        )));
    }

    Ok(())
}

fn validate_stats(config: &Config) -> Result<()> {
    if config.stats.request_metric.trim().is_empty() {
        return Err(Error::Config("stats.request_metric cannot be empty".to_string()));
    }

    if config.stats.db_prefix.trim().is_empty() {
        return Err(Error::Config("stats.db_prefix cannot be empty".to_string()));
    }

    if !config.stats.enabled {
        tracing::warn!("stats are disabled; request and database metrics will not be emitted");
    }

    Ok(())
}

fn validate_database(config: &Config) -> Result<()> {
    if config.database.pool_prefix.trim().is_empty() {
        return Err(Error::Config("database.pool_prefix cannot be empty".to_string()));
    }

    if config.database.pool_interval.is_zero() {
        return Err(Error::Config("database.pool_interval must be > 0".to_string()));
    }

    Ok(())
}
