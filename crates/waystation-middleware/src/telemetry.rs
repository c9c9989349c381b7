//! Tracing subscriber setup

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use waystation_config::{LogFormat, LoggingConfig};
use waystation_core::{Error, Result};

/// Build the filter: `RUST_LOG` when set, plus the configured level.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let level = config
        .level
        .parse::<tracing::Level>()
        .map_err(|e| Error::Config(format!("Invalid log level '{}': {e}", config.level)))?;

    Ok(EnvFilter::from_default_env().add_directive(level.into()))
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .try_init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_level(true),
            )
            .try_init(),
    };

    installed.map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_rejects_unknown_level() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };

        assert!(matches!(env_filter(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_filter_accepts_levels() {
        for level in ["trace", "debug", "info", "warn", "error", "INFO"] {
            let config = LoggingConfig {
                level: level.to_string(),
                ..LoggingConfig::default()
            };
            assert!(env_filter(&config).is_ok(), "{level}");
        }
    }
}
