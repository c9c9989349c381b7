//! # Waystation Middleware
//!
//! Middlewares that sit in front of Waystation handlers:
//! - Structured request logging
//! - Request timing stats
//! - Per-request database query stats
//! - Database connection release
//!
//! Plus connection pool gauges and tracing subscriber setup.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod builder;
pub mod connection_management;
pub mod db_stats;
pub mod logging;
pub mod pool_instrumenter;
pub mod sink;
pub mod stats;
pub mod telemetry;

pub use builder::MiddlewareBuilder;
pub use connection_management::{ConnectionManagement, ConnectionReleaser};
pub use db_stats::{
    record_query, DbStatsCollector, DbStatsMiddleware, QuerySnapshot, QueryStats,
    DEFAULT_DB_PREFIX,
};
pub use logging::{response_log, RequestLogInput, RequestLogger, RequestLoggerConfig, ResponseLog};
pub use pool_instrumenter::{
    ConnectionPoolInstrumenter, PoolStats, DEFAULT_POOL_INTERVAL, DEFAULT_POOL_PREFIX,
};
pub use sink::{MetricsSink, StatsSink};
pub use stats::{origin_tag, StatsMiddleware, DEFAULT_REQUEST_METRIC};
pub use telemetry::{env_filter, init_tracing};

// Re-export core middleware types from waystation-core
pub use waystation_core::middleware::{Middleware, Next};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::builder::MiddlewareBuilder;
    pub use crate::connection_management::{ConnectionManagement, ConnectionReleaser};
    pub use crate::db_stats::{record_query, DbStatsMiddleware};
    pub use crate::logging::{RequestLogger, RequestLoggerConfig};
    pub use crate::pool_instrumenter::{ConnectionPoolInstrumenter, PoolStats};
    pub use crate::sink::{MetricsSink, StatsSink};
    pub use crate::stats::StatsMiddleware;
    pub use waystation_core::middleware::{Middleware, Next};
}
