//! Configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Request logging
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Request and database stats
    #[serde(default)]
    pub stats: StatsConfig,

    /// Database connection handling
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,

    /// Include bodies of successful responses in request logs
    #[serde(default)]
    pub log_response_body: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_response_body: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable text
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Stats configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsConfig {
    /// Emit request and database stats
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Distribution name for request timings
    #[serde(default = "default_request_metric")]
    pub request_metric: String,

    /// Prefix for per-request database histograms
    #[serde(default = "default_db_prefix")]
    pub db_prefix: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            request_metric: default_request_metric(),
            db_prefix: default_db_prefix(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_request_metric() -> String {
    "web.request".to_string()
}

fn default_db_prefix() -> String {
    "web.request.db".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Release connections after every request
    #[serde(default = "default_true")]
    pub release_connections: bool,

    /// Prefix for connection pool gauges
    #[serde(default = "default_pool_prefix")]
    pub pool_prefix: String,

    /// How often pool gauges are reported
    #[serde(default = "default_pool_interval", with = "humantime_serde")]
    pub pool_interval: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            release_connections: true,
            pool_prefix: default_pool_prefix(),
            pool_interval: default_pool_interval(),
        }
    }
}

fn default_pool_prefix() -> String {
    "db.connection_pool".to_string()
}

fn default_pool_interval() -> Duration {
    Duration::from_secs(1)
}
